//! Contact model types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::account::UserId;

/// Unique identifier for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub i64);

impl ContactId {
    /// Create a new contact ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A contact record owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier.
    pub id: ContactId,
    /// Owning user.
    pub owner_id: UserId,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Birthday. The year is stored but ignored by window matching.
    pub birthday: NaiveDate,
    /// Email address, unique within the owner's contacts.
    pub email: String,
    /// Phone number, unique within the owner's contacts.
    pub phone: String,
    /// Free-text note.
    pub note: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time; refreshed on every update.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Birthday.
    pub birthday: NaiveDate,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Free-text note.
    pub note: Option<String>,
}

/// A partial update: only supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    /// New first name, if supplied.
    pub firstname: Option<String>,
    /// New last name, if supplied.
    pub lastname: Option<String>,
    /// New birthday, if supplied.
    pub birthday: Option<NaiveDate>,
    /// New email address, if supplied.
    pub email: Option<String>,
    /// New phone number, if supplied.
    pub phone: Option<String>,
    /// New note, if supplied. An omitted note and an absent field are the
    /// same thing here, so a patch can replace a stored note but never
    /// clear it.
    pub note: Option<String>,
}

impl ContactPatch {
    /// Sets the first name.
    #[must_use]
    pub fn firstname(mut self, value: impl Into<String>) -> Self {
        self.firstname = Some(value.into());
        self
    }

    /// Sets the last name.
    #[must_use]
    pub fn lastname(mut self, value: impl Into<String>) -> Self {
        self.lastname = Some(value.into());
        self
    }

    /// Sets the birthday.
    #[must_use]
    pub const fn birthday(mut self, value: NaiveDate) -> Self {
        self.birthday = Some(value);
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    /// Sets the note.
    #[must_use]
    pub fn note(mut self, value: impl Into<String>) -> Self {
        self.note = Some(value.into());
        self
    }

    /// True when no field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.firstname.is_none()
            && self.lastname.is_none()
            && self.birthday.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.note.is_none()
    }
}

/// Optional filters and paging for contact listings.
///
/// Each filter is an independent case-insensitive substring match; supplied
/// filters are AND-combined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactFilter {
    /// Substring match on the first name.
    pub firstname: Option<String>,
    /// Substring match on the last name.
    pub lastname: Option<String>,
    /// Substring match on the email address.
    pub email: Option<String>,
    /// Rows to skip.
    pub offset: u32,
    /// Maximum rows returned.
    pub limit: u32,
}

impl ContactFilter {
    /// Default page size for listings.
    pub const DEFAULT_LIMIT: u32 = 100;

    /// Sets the first-name filter.
    #[must_use]
    pub fn firstname(mut self, value: impl Into<String>) -> Self {
        self.firstname = Some(value.into());
        self
    }

    /// Sets the last-name filter.
    #[must_use]
    pub fn lastname(mut self, value: impl Into<String>) -> Self {
        self.lastname = Some(value.into());
        self
    }

    /// Sets the email filter.
    #[must_use]
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Sets the number of rows to skip.
    #[must_use]
    pub const fn offset(mut self, value: u32) -> Self {
        self.offset = value;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, value: u32) -> Self {
        self.limit = value;
        self
    }
}

impl Default for ContactFilter {
    fn default() -> Self {
        Self {
            firstname: None,
            lastname: None,
            email: None,
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
