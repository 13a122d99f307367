//! # supermodels-db
//!
//! libSQL persistence for owner metadata and activity logs.
//!
//! Both side tables reference their owner polymorphically through
//! `(model_type, model_id)`, so any record type can attach rows. Table names
//! come from `supermodels-config` and are substituted into the embedded
//! migrations at open time.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use supermodels_config::{SuperConfig, TablesConfig};

/// Database handle for the metadata and log side tables.
pub struct SuperDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    tables: TablesConfig,
}

impl SuperDb {
    /// Open a local database at the given path with the given table names.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str, tables: TablesConfig) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let super_db = Self { db, conn, tables };
        super_db.run_migrations().await?;
        tracing::debug!(
            path,
            meta_table = %super_db.tables.meta,
            log_table = %super_db.tables.log,
            "opened database"
        );
        Ok(super_db)
    }

    /// Open the database described by a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Config` if the configuration is invalid, or
    /// `DatabaseError` if opening or migrating fails.
    pub async fn open(config: &SuperConfig) -> Result<Self, DatabaseError> {
        config.validate()?;
        Self::open_local(&config.database.path, config.tables.clone()).await
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub fn meta_table(&self) -> &str {
        &self.tables.meta
    }

    #[must_use]
    pub fn log_table(&self) -> &str {
        &self.tables.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> SuperDb {
        SuperDb::open_local(":memory:", TablesConfig::default())
            .await
            .unwrap()
    }

    async fn table_exists(db: &SuperDb, table: &str) -> bool {
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
            )
            .await
            .unwrap();
        rows.next().await.unwrap().is_some()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        for table in ["metadata", "logs"] {
            assert!(table_exists(&db, table).await, "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn configured_table_names_are_used() {
        let tables = TablesConfig {
            meta: "post_meta".into(),
            log: "post_activity".into(),
        };
        let db = SuperDb::open_local(":memory:", tables).await.unwrap();
        assert!(table_exists(&db, "post_meta").await);
        assert!(table_exists(&db, "post_activity").await);
        assert!(!table_exists(&db, "metadata").await);
        assert_eq!(db.meta_table(), "post_meta");
        assert_eq!(db.log_table(), "post_activity");
    }

    #[tokio::test]
    async fn open_rejects_invalid_config() {
        let mut config = SuperConfig::default();
        config.tables.meta = "bad name".into();
        let result = SuperDb::open(&config).await;
        assert!(matches!(result, Err(DatabaseError::Config(_))));
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn meta_unique_per_owner_and_name() {
        let db = test_db().await;
        let insert = "INSERT INTO metadata (model_type, model_id, name, value) VALUES (?1, ?2, ?3, 'x')";

        db.conn()
            .execute(insert, libsql::params!["post", 1_i64, "color"])
            .await
            .unwrap();
        // Same name on another owner is fine.
        db.conn()
            .execute(insert, libsql::params!["post", 2_i64, "color"])
            .await
            .unwrap();
        db.conn()
            .execute(insert, libsql::params!["user", 1_i64, "color"])
            .await
            .unwrap();

        let duplicate = db
            .conn()
            .execute(insert, libsql::params!["post", 1_i64, "color"])
            .await;
        assert!(duplicate.is_err(), "duplicate (owner, name) should be rejected");
    }

    #[tokio::test]
    async fn log_defaults_applied() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO logs (model_type, model_id, action, content) VALUES ('post', 1, 'viewed', '')",
                (),
            )
            .await
            .unwrap();
        let mut rows = db
            .conn()
            .query("SELECT type, notified, user_id FROM logs", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "log");
        assert_eq!(row.get::<i64>(1).unwrap(), 0);
        assert_eq!(row.get::<Option<i64>>(2).unwrap(), None);
    }
}
