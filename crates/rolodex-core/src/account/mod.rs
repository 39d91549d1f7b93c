//! User account management.
//!
//! Registration, login, and the one-way `Unconfirmed -> Confirmed` email
//! confirmation transition.

mod model;
pub(crate) mod repository;
mod service;
pub(crate) mod validation;

pub use model::{AccessGrant, ConfirmationOutcome, Credentials, NewUser, User, UserId};
pub use repository::UserRepository;
pub use service::AccountService;
pub use validation::{ValidationError, ValidationResult, validate_new_user};
