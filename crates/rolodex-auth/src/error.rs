//! Error types for credential operations.

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Credential error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Token failed verification.
    ///
    /// Covers bad signatures, expiry, wrong purpose, and malformed payloads
    /// without distinguishing between them; callers surface all of these as a
    /// single unauthorized condition.
    #[error("invalid token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Password hashing failed or the stored hash is malformed.
    #[error("password hash error: {0}")]
    PasswordHash(String),
}
