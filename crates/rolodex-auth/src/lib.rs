//! # rolodex-auth
//!
//! Stateless credentials for the Rolodex contact backend.
//!
//! ## Features
//!
//! - **Access tokens**: signed, time-bounded credentials carrying a username
//! - **Confirmation tokens**: single-purpose credentials proving control of an
//!   email address
//! - **Password hashing**: one-way Argon2id hashing with per-hash salts
//!
//! Both token kinds are minted by the same [`TokenSigner`] but carry a purpose
//! tag inside the signed payload, so one kind can never be redeemed as the
//! other. Verification failures are deliberately undifferentiated: expiry,
//! signature, purpose, and shape problems all surface as
//! [`Error::InvalidToken`].
//!
//! ## Quick Start
//!
//! ```
//! use rolodex_auth::TokenSigner;
//!
//! # fn main() -> rolodex_auth::Result<()> {
//! let signer = TokenSigner::new("signing-secret");
//!
//! let token = signer.issue_access_token("alice")?;
//! assert_eq!(signer.verify_access_token(&token)?, "alice");
//!
//! // An access token is not a confirmation token.
//! assert!(signer.resolve_confirmation_token(&token).is_err());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod password;
mod token;

pub use error::{Error, Result};
pub use password::{hash_password, verify_password};
pub use token::TokenSigner;
