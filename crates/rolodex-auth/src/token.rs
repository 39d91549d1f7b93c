//! Signed-token issuing and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Purpose tag embedded in every signed payload.
///
/// Checked during verification, not after, so the two token kinds share the
/// signing mechanism without sharing a redemption path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Purpose {
    Access,
    Confirm,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    purpose: Purpose,
    iat: i64,
    exp: i64,
}

/// Issues and verifies the two token kinds used by the backend.
///
/// Access tokens carry a username and authorize API calls; confirmation
/// tokens carry an email address and are redeemed once to confirm it.
/// Tokens are stateless and never persisted.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    confirm_ttl: Duration,
}

impl TokenSigner {
    /// Default access-token lifetime in minutes.
    pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;
    /// Default confirmation-token lifetime in hours.
    pub const DEFAULT_CONFIRM_TTL_HOURS: i64 = 24;

    /// Creates a signer from a shared secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(Self::DEFAULT_ACCESS_TTL_MINUTES),
            confirm_ttl: Duration::hours(Self::DEFAULT_CONFIRM_TTL_HOURS),
        }
    }

    /// Sets the access-token lifetime.
    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Sets the confirmation-token lifetime.
    #[must_use]
    pub fn with_confirm_ttl(mut self, ttl: Duration) -> Self {
        self.confirm_ttl = ttl;
        self
    }

    /// Issues an access token for a username.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be signed.
    pub fn issue_access_token(&self, username: &str) -> Result<String> {
        self.issue(username, Purpose::Access, self.access_ttl)
    }

    /// Verifies an access token and returns the username it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidToken`] for any expired, tampered, malformed,
    /// or wrong-purpose token.
    pub fn verify_access_token(&self, token: &str) -> Result<String> {
        self.verify(token, Purpose::Access)
    }

    /// Issues an email-confirmation token.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be signed.
    pub fn issue_confirmation_token(&self, email: &str) -> Result<String> {
        self.issue(email, Purpose::Confirm, self.confirm_ttl)
    }

    /// Resolves a confirmation token back to the email address it proves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidToken`] for any expired, tampered, malformed,
    /// or wrong-purpose token.
    pub fn resolve_confirmation_token(&self, token: &str) -> Result<String> {
        self.verify(token, Purpose::Confirm)
    }

    fn issue(&self, subject: &str, purpose: Purpose, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_owned(),
            purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, purpose: Purpose) -> Result<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Short-lived tokens: expiry means expiry, no clock leeway.
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| Error::InvalidToken)?;

        if data.claims.purpose != purpose {
            return Err(Error::InvalidToken);
        }

        Ok(data.claims.sub)
    }
}
