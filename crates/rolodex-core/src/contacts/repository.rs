//! Contact storage repository.
//!
//! The store is the only serialization point between racing requests, so
//! per-owner uniqueness of email and phone lives in the table constraints
//! rather than in a check-then-insert sequence.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use super::model::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
use crate::account::UserId;
use crate::error::{Error, Result};

const CONTACT_COLUMNS: &str =
    "id, owner_id, firstname, lastname, birthday, email, phone, note, created_at, updated_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Initialize the contacts table. Requires the users table.
pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            firstname TEXT NOT NULL,
            lastname TEXT NOT NULL,
            birthday TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            note TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(owner_id, email),
            UNIQUE(owner_id, phone)
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE INDEX IF NOT EXISTS idx_contacts_owner ON contacts(owner_id)
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Repository for contact storage and queries, always scoped to an owner.
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    /// Creates a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a contact for the given owner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the owner already has a contact with
    /// this email or phone; the race between two identical creates is
    /// resolved by the unique constraints, not by a pre-check.
    pub async fn create(&self, owner_id: UserId, contact: &NewContact) -> Result<Contact> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO contacts
                (owner_id, firstname, lastname, birthday, email, phone, note,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(owner_id.0)
        .bind(&contact.firstname)
        .bind(&contact.lastname)
        .bind(contact.birthday.format(DATE_FORMAT).to_string())
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.note.as_deref())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::conflict_on_unique(
                e,
                "A contact with this email or phone number already exists.",
            )
        })?;

        let id = ContactId(result.last_insert_rowid());
        debug!(%id, %owner_id, "contact created");

        Ok(Contact {
            id,
            owner_id,
            firstname: contact.firstname.clone(),
            lastname: contact.lastname.clone(),
            birthday: contact.birthday,
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            note: contact.note.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetches one of the owner's contacts by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist for this owner.
    pub async fn get(&self, owner_id: UserId, id: ContactId) -> Result<Contact> {
        let row = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ? AND owner_id = ?"
        ))
        .bind(id.0)
        .bind(owner_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .and_then(row_to_contact)
            .ok_or_else(|| Error::NotFound(format!("Contact with ID {id} not found.")))
    }

    /// Lists the owner's contacts with optional filters and paging.
    ///
    /// Filters are case-insensitive substring matches, AND-combined.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, owner_id: UserId, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE owner_id = ?
              AND LOWER(firstname) LIKE ?
              AND LOWER(lastname) LIKE ?
              AND LOWER(email) LIKE ?
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "
        ))
        .bind(owner_id.0)
        .bind(like_pattern(filter.firstname.as_deref()))
        .bind(like_pattern(filter.lastname.as_deref()))
        .bind(like_pattern(filter.email.as_deref()))
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(row_to_contact).collect())
    }

    /// Applies a partial update to one of the owner's contacts.
    ///
    /// Only supplied fields change; `updated_at` is refreshed. A failed
    /// update leaves the store untouched. The note is kept when the patch
    /// omits it (see [`ContactPatch::note`]); there is no way to clear it
    /// through a patch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist for this owner,
    /// or [`Error::Conflict`] if the new email or phone collides with
    /// another of the owner's contacts.
    pub async fn update(
        &self,
        owner_id: UserId,
        id: ContactId,
        patch: &ContactPatch,
    ) -> Result<Contact> {
        let current = self.get(owner_id, id).await?;
        let now = Utc::now();

        let updated = Contact {
            id: current.id,
            owner_id: current.owner_id,
            firstname: patch.firstname.clone().unwrap_or(current.firstname),
            lastname: patch.lastname.clone().unwrap_or(current.lastname),
            birthday: patch.birthday.unwrap_or(current.birthday),
            email: patch.email.clone().unwrap_or(current.email),
            phone: patch.phone.clone().unwrap_or(current.phone),
            note: patch.note.clone().or(current.note),
            created_at: current.created_at,
            updated_at: now,
        };

        sqlx::query(
            r"
            UPDATE contacts
            SET firstname = ?, lastname = ?, birthday = ?, email = ?, phone = ?,
                note = ?, updated_at = ?
            WHERE id = ? AND owner_id = ?
            ",
        )
        .bind(&updated.firstname)
        .bind(&updated.lastname)
        .bind(updated.birthday.format(DATE_FORMAT).to_string())
        .bind(&updated.email)
        .bind(&updated.phone)
        .bind(updated.note.as_deref())
        .bind(now.to_rfc3339())
        .bind(id.0)
        .bind(owner_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::conflict_on_unique(
                e,
                "A contact with this email or phone number already exists.",
            )
        })?;

        debug!(%id, %owner_id, "contact updated");
        Ok(updated)
    }

    /// Deletes one of the owner's contacts and returns the deleted record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id does not exist for this owner;
    /// deleting the same id twice fails the second time.
    pub async fn delete(&self, owner_id: UserId, id: ContactId) -> Result<Contact> {
        let contact = self.get(owner_id, id).await?;

        let result = sqlx::query("DELETE FROM contacts WHERE id = ? AND owner_id = ?")
            .bind(id.0)
            .bind(owner_id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Contact with ID {id} not found.")));
        }

        debug!(%id, %owner_id, "contact deleted");
        Ok(contact)
    }

    /// Contacts whose birthday falls within `days` days from `today`,
    /// comparing month and day only and ordering by (month, day) ascending.
    ///
    /// The window rule matches a birthday in today's month from today's
    /// day-of-month up to the end date's day-of-month (to the end of the
    /// month when the window crosses into the next one), or in a later
    /// month up to the end date's day-of-month. A window reaching past
    /// December therefore never wraps into January, and a window longer
    /// than one month over-matches the early days of every later month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn upcoming_birthdays(
        &self,
        owner_id: UserId,
        today: NaiveDate,
        days: u32,
    ) -> Result<Vec<Contact>> {
        let end = today + Duration::days(i64::from(days));
        // BETWEEN only holds inside a single month; once the window spills
        // over, the rest of the current month is in range.
        let same_month_end = if end.month() == today.month() {
            end.day()
        } else {
            31
        };

        let rows = sqlx::query(&format!(
            r"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE owner_id = ?
              AND (
                (CAST(strftime('%m', birthday) AS INTEGER) = ?
                  AND CAST(strftime('%d', birthday) AS INTEGER) BETWEEN ? AND ?)
                OR
                (CAST(strftime('%m', birthday) AS INTEGER) > ?
                  AND CAST(strftime('%d', birthday) AS INTEGER) <= ?)
              )
            ORDER BY CAST(strftime('%m', birthday) AS INTEGER) ASC,
                     CAST(strftime('%d', birthday) AS INTEGER) ASC
            "
        ))
        .bind(owner_id.0)
        .bind(i64::from(today.month()))
        .bind(i64::from(today.day()))
        .bind(i64::from(same_month_end))
        .bind(i64::from(today.month()))
        .bind(i64::from(end.day()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(row_to_contact).collect())
    }
}

/// An absent filter becomes `%`, which matches every row of these NOT NULL
/// columns.
fn like_pattern(filter: Option<&str>) -> String {
    filter.map_or_else(
        || "%".to_owned(),
        |value| format!("%{}%", value.trim().to_lowercase()),
    )
}

fn row_to_contact(row: &SqliteRow) -> Option<Contact> {
    let birthday_str: String = row.get("birthday");
    let birthday = NaiveDate::parse_from_str(&birthday_str, DATE_FORMAT).ok()?;

    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .ok()?
        .with_timezone(&Utc);

    let updated_at_str: String = row.get("updated_at");
    let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
        .ok()?
        .with_timezone(&Utc);

    Some(Contact {
        id: ContactId(row.get::<i64, _>("id")),
        owner_id: UserId(row.get::<i64, _>("owner_id")),
        firstname: row.get("firstname"),
        lastname: row.get("lastname"),
        birthday,
        email: row.get("email"),
        phone: row.get("phone"),
        note: row.get("note"),
        created_at,
        updated_at,
    })
}
