//! Registration input validation.

use super::model::NewUser;

/// Validation error for registration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Username outside 2-50 characters.
    UsernameLength,
    /// Email outside 7-100 characters.
    EmailLength,
    /// Email address format is invalid.
    InvalidEmail,
    /// Password shorter than 6 characters.
    PasswordLength,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::UsernameLength => "Username must be 2-50 characters",
            Self::EmailLength => "Email must be 7-100 characters",
            Self::InvalidEmail => "Invalid email address format",
            Self::PasswordLength => "Password must be at least 6 characters",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::UsernameLength => "username",
            Self::EmailLength | Self::InvalidEmail => "email",
            Self::PasswordLength => "password",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating registration input.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate registration input.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_new_user(new_user: &NewUser) -> ValidationResult {
    let mut errors = Vec::new();

    let username_len = new_user.username.chars().count();
    if !(2..=50).contains(&username_len) {
        errors.push(ValidationError::UsernameLength);
    }

    let email_len = new_user.email.chars().count();
    if !(7..=100).contains(&email_len) {
        errors.push(ValidationError::EmailLength);
    } else if !is_plausible_email(&new_user.email) {
        errors.push(ValidationError::InvalidEmail);
    }

    if new_user.password.chars().count() < 6 {
        errors.push(ValidationError::PasswordLength);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Minimal shape check: local part, one `@`, a dot in the domain.
pub(crate) fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
