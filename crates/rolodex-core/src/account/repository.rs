//! User storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use super::model::{User, UserId};
use crate::error::{Error, Result};

/// Initialize the users table.
pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            avatar TEXT,
            confirmed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Repository for user storage and retrieval.
///
/// Uniqueness of username and email is enforced by the table constraints,
/// not by a lookup before the insert: two registrations racing on the same
/// name resolve to one success and one [`Error::Conflict`].
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new, unconfirmed user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the username or email is taken, or a
    /// database error otherwise.
    pub async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::conflict_on_unique(e, "A user with this username or email already exists.")
        })?;

        let id = UserId(result.last_insert_rowid());
        debug!(%id, username, "user registered");

        Ok(User {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            avatar: None,
            confirmed: false,
            created_at: now,
        })
    }

    /// Looks up a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, password_hash, avatar, confirmed, created_at
            FROM users
            WHERE username = ?
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(row_to_user))
    }

    /// Looks up a user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, password_hash, avatar, confirmed, created_at
            FROM users
            WHERE email = ?
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(row_to_user))
    }

    /// Marks the account owning `email` as confirmed.
    ///
    /// Idempotent at the storage level; the service decides whether a second
    /// confirmation is reported as a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn mark_confirmed(&self, email: &str) -> Result<()> {
        sqlx::query("UPDATE users SET confirmed = 1 WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;

        debug!(email, "account confirmed");
        Ok(())
    }

    /// Sets the avatar URL for the account owning `email`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such user exists.
    pub async fn set_avatar(&self, email: &str, url: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET avatar = ? WHERE email = ?")
            .bind(url)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User '{email}' not found.")));
        }

        Ok(())
    }

    /// Deletes a user and, through the schema, all of their contacts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such user exists.
    pub async fn delete(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {id} not found.")));
        }

        debug!(%id, "user deleted");
        Ok(())
    }
}

fn row_to_user(row: &SqliteRow) -> Option<User> {
    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .ok()?
        .with_timezone(&Utc);

    Some(User {
        id: UserId(row.get::<i64, _>("id")),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        avatar: row.get("avatar"),
        confirmed: row.get::<bool, _>("confirmed"),
        created_at,
    })
}
