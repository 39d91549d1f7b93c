//! Contact field validation.

use super::model::{ContactPatch, NewContact};
use crate::account::validation::is_plausible_email;

/// Validation error for contact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// First name outside 2-50 characters.
    FirstnameLength,
    /// Last name outside 2-50 characters.
    LastnameLength,
    /// Email outside 7-100 characters.
    EmailLength,
    /// Email address format is invalid.
    InvalidEmail,
    /// Phone number outside 7-20 characters.
    PhoneLength,
    /// Note longer than 500 characters.
    NoteLength,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::FirstnameLength => "First name must be 2-50 characters",
            Self::LastnameLength => "Last name must be 2-50 characters",
            Self::EmailLength => "Email must be 7-100 characters",
            Self::InvalidEmail => "Invalid email address format",
            Self::PhoneLength => "Phone number must be 7-20 characters",
            Self::NoteLength => "Note must be at most 500 characters",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::FirstnameLength => "firstname",
            Self::LastnameLength => "lastname",
            Self::EmailLength | Self::InvalidEmail => "email",
            Self::PhoneLength => "phone",
            Self::NoteLength => "note",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating contact input.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate the fields of a new contact.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_new_contact(contact: &NewContact) -> ValidationResult {
    let mut errors = Vec::new();

    check_name(&contact.firstname, ValidationError::FirstnameLength, &mut errors);
    check_name(&contact.lastname, ValidationError::LastnameLength, &mut errors);
    check_email(&contact.email, &mut errors);
    check_phone(&contact.phone, &mut errors);
    if let Some(note) = &contact.note {
        check_note(note, &mut errors);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate the supplied fields of a partial update; absent fields pass.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any supplied fields are invalid.
pub fn validate_patch(patch: &ContactPatch) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(firstname) = &patch.firstname {
        check_name(firstname, ValidationError::FirstnameLength, &mut errors);
    }
    if let Some(lastname) = &patch.lastname {
        check_name(lastname, ValidationError::LastnameLength, &mut errors);
    }
    if let Some(email) = &patch.email {
        check_email(email, &mut errors);
    }
    if let Some(phone) = &patch.phone {
        check_phone(phone, &mut errors);
    }
    if let Some(note) = &patch.note {
        check_note(note, &mut errors);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_name(value: &str, error: ValidationError, errors: &mut Vec<ValidationError>) {
    if !(2..=50).contains(&value.chars().count()) {
        errors.push(error);
    }
}

fn check_email(value: &str, errors: &mut Vec<ValidationError>) {
    if !(7..=100).contains(&value.chars().count()) {
        errors.push(ValidationError::EmailLength);
    } else if !is_plausible_email(value) {
        errors.push(ValidationError::InvalidEmail);
    }
}

fn check_phone(value: &str, errors: &mut Vec<ValidationError>) {
    if !(7..=20).contains(&value.chars().count()) {
        errors.push(ValidationError::PhoneLength);
    }
}

fn check_note(value: &str, errors: &mut Vec<ValidationError>) {
    if value.chars().count() > 500 {
        errors.push(ValidationError::NoteLength);
    }
}
