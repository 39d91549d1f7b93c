//! Error types for the core library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the account and contact services.
///
/// Each variant corresponds to exactly one response status in a hosting
/// layer: `Conflict` to 409, `NotFound` to 404, `Unauthorized` to 401,
/// `Validation` to 400. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// A unique field (email, phone, username) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Bad credentials, an unconfirmed account, or an invalid token.
    ///
    /// Carries no detail about which check failed.
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed input, rejected before any store write.
    #[error("validation error: {0}")]
    Validation(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Credential machinery failed while issuing a token or hashing a
    /// password. Verification failures map to [`Error::Unauthorized`]
    /// instead.
    #[error("credential error: {0}")]
    Credential(#[from] rolodex_auth::Error),
}

impl Error {
    /// Builds a `Validation` error from field-level violations.
    pub(crate) fn validation<E: std::fmt::Display>(errors: &[E]) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(message)
    }

    /// Maps a unique-constraint violation to `Conflict`, leaving every other
    /// database failure untouched.
    pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(message.to_owned())
            }
            _ => Self::Database(err),
        }
    }
}
