//! Contact service: validation and queries on top of the store.

use chrono::Local;

use super::model::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use super::repository::ContactRepository;
use super::validation::{validate_new_contact, validate_patch};
use crate::account::UserId;
use crate::error::{Error, Result};

/// Validates input and runs contact queries for one storage backend.
///
/// Store failures (`Conflict`, `NotFound`) pass through unchanged; this
/// layer only adds input validation and the "today" anchor for the
/// birthday window.
pub struct ContactService {
    contacts: ContactRepository,
}

impl ContactService {
    /// Creates a service over a contact repository.
    #[must_use]
    pub const fn new(contacts: ContactRepository) -> Self {
        Self { contacts }
    }

    /// Creates a contact for the owner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed fields, or
    /// [`Error::Conflict`] if the owner already has this email or phone.
    pub async fn create(&self, owner_id: UserId, contact: &NewContact) -> Result<Contact> {
        validate_new_contact(contact).map_err(|errors| Error::validation(&errors))?;
        self.contacts.create(owner_id, contact).await
    }

    /// Lists the owner's contacts with optional filters and paging.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, owner_id: UserId, filter: &ContactFilter) -> Result<Vec<Contact>> {
        self.contacts.list(owner_id, filter).await
    }

    /// Fetches one contact by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist for this owner.
    pub async fn get(&self, owner_id: UserId, id: ContactId) -> Result<Contact> {
        self.contacts.get(owner_id, id).await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed supplied fields,
    /// [`Error::NotFound`] for a missing id, or [`Error::Conflict`] for a
    /// colliding email or phone.
    pub async fn update(
        &self,
        owner_id: UserId,
        id: ContactId,
        patch: &ContactPatch,
    ) -> Result<Contact> {
        validate_patch(patch).map_err(|errors| Error::validation(&errors))?;
        self.contacts.update(owner_id, id, patch).await
    }

    /// Deletes a contact and returns the deleted record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist for this owner.
    pub async fn delete(&self, owner_id: UserId, id: ContactId) -> Result<Contact> {
        self.contacts.delete(owner_id, id).await
    }

    /// Contacts with a birthday within the next `days` days, anchored at
    /// the local calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `days` is zero.
    pub async fn upcoming_birthdays(&self, owner_id: UserId, days: u32) -> Result<Vec<Contact>> {
        if days == 0 {
            return Err(Error::Validation(
                "Days must be greater than or equal to 1.".to_owned(),
            ));
        }

        let today = Local::now().date_naive();
        self.contacts.upcoming_birthdays(owner_id, today, days).await
    }
}
