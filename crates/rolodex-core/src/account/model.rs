//! Account model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Login name, unique across all users.
    pub username: String,
    /// Email address, unique across all users.
    pub email: String,
    /// Argon2 hash of the password. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Avatar image URL, if one has been set.
    pub avatar: Option<String>,
    /// Whether the email address has been confirmed.
    pub confirmed: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Fields required to register a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired login name.
    pub username: String,
    /// Email address to confirm.
    pub email: String,
    /// Plaintext password; hashed before it reaches the store.
    pub password: String,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// A successful login: bearer token plus its type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    /// Signed access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl AccessGrant {
    /// Wraps a signed token as a bearer grant.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "bearer".to_owned(),
        }
    }
}

/// Result of redeeming a confirmation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationOutcome {
    /// The account transitioned to confirmed.
    Confirmed,
    /// The account was already confirmed; redemption is a no-op.
    AlreadyConfirmed,
}

impl ConfirmationOutcome {
    /// Human-readable message for the caller.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Confirmed => "Your email has been confirmed.",
            Self::AlreadyConfirmed => "Your email has already been confirmed.",
        }
    }
}
