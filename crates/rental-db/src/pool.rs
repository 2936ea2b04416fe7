//! # Database Handle
//!
//! Opens the SQLite file, applies the schema and hands out repositories.
//!
//! ```text
//! RentalSettings ──► DbConfig ──► Database::new ──► migrations
//!                                      │
//!                                      ├── companies()    CompanyRepository
//!                                      ├── reservations() ReservationRepository
//!                                      └── store()        SqliteStore (for sessions)
//! ```
//!
//! The file runs in WAL mode: availability browsing keeps reading while a
//! reservation batch is being written. Writers queue on `busy_timeout`
//! instead of failing with `SQLITE_BUSY`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::company::CompanyRepository;
use crate::repository::reservation::ReservationRepository;
use crate::store::SqliteStore;

// =============================================================================
// Configuration
// =============================================================================

/// Where the rental database lives and how many connections may use it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// How long a writer waits for another connection's write lock.
    pub busy_timeout: Duration,
    /// How long a caller waits for a free pooled connection.
    pub acquire_timeout: Duration,
}

impl DbConfig {
    /// A file-backed database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private in-memory database for tests.
    ///
    /// One connection only: each SQLite `:memory:` connection would otherwise
    /// see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the rental database; clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Fleet and reservation integrity rely on the composite keys.
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        let (total, applied) = migrations::migration_status(&pool).await?;
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            migrations = applied,
            known = total,
            "Rental database ready"
        );

        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository::new(self.pool.clone())
    }

    pub fn reservations(&self) -> ReservationRepository {
        ReservationRepository::new(self.pool.clone())
    }

    /// The `RentalStore` the sessions run against.
    pub fn store(&self) -> SqliteStore {
        SqliteStore::new(self.companies(), self.reservations())
    }

    /// Waits for open connections to finish; later calls fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(db.companies().list_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_database_rejects_queries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(matches!(
            db.companies().list_names().await,
            Err(DbError::ConnectionFailed(_))
        ));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/rental.db").max_connections(10);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.database_path, PathBuf::from("/tmp/rental.db"));
    }
}
