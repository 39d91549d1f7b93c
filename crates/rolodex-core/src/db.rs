//! Database pool construction and schema setup.
//!
//! Users and contacts live in one database so the owner foreign key can
//! cascade; the pool is built here once and handed to each repository.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::account::UserRepository;
use crate::contacts::ContactRepository;
use crate::error::Result;

/// Shared database handle for the backend's repositories.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or schema creation fails.
    pub async fn open(database_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Creates an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Initialize database schema. Users first: contacts reference them.
    async fn initialize(&self) -> Result<()> {
        crate::account::repository::initialize(&self.pool).await?;
        crate::contacts::repository::initialize(&self.pool).await?;
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates a user repository backed by this database.
    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Creates a contact repository backed by this database.
    #[must_use]
    pub fn contacts(&self) -> ContactRepository {
        ContactRepository::new(self.pool.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::account::UserId;
    use crate::contacts::NewContact;
    use crate::error::Error;

    #[tokio::test]
    async fn owner_foreign_key_is_enforced() {
        let db = Database::in_memory().await.unwrap();
        let contact = NewContact {
            firstname: "Ada".to_owned(),
            lastname: "Lovelace".to_owned(),
            birthday: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            email: "ada@example.com".to_owned(),
            phone: "+44000000001".to_owned(),
            note: None,
        };

        // No such user; the insert must be rejected by the schema.
        let result = db.contacts().create(UserId(42), &contact).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }
}
