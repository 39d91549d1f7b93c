//! # rolodex-core
//!
//! Core business logic for the Rolodex contact backend.
//!
//! This crate provides:
//! - Account management (registration, login, email confirmation)
//! - Owner-scoped contact storage (`SQLite`)
//! - Contact queries: filtered listing and the upcoming-birthdays window
//! - Outbound confirmation-mail seam
//!
//! The HTTP layer is a consumer of this crate, not part of it: every service
//! call maps one-to-one onto an endpoint, and every [`Error`] variant maps
//! onto a single response status.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod contacts;
mod db;
mod error;
pub mod mailer;

pub use account::{
    AccessGrant, AccountService, ConfirmationOutcome, Credentials, NewUser, User, UserId,
    UserRepository,
};
pub use contacts::{
    Contact, ContactFilter, ContactId, ContactPatch, ContactRepository, ContactService, NewContact,
};
pub use db::Database;
pub use error::{Error, Result};
pub use mailer::{ConfirmationMailer, LogMailer, MailerError, confirmation_link};
