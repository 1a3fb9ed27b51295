//! Database Module
//!
//! SQLite connection pool, migrations, and one repository module per table.
//! Repository functions take `&SqlitePool` for standalone reads or
//! `&mut SqliteConnection` when they must run inside a caller's transaction.

pub mod categories;
pub mod orders;
pub mod products;
pub mod roles;
pub mod search_logs;
pub mod users;

use shared::error::AppError;
use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database service owning the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database with WAL mode and apply migrations
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Writers wait for the lock instead of failing immediately
            .busy_timeout(BUSY_TIMEOUT)
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(
            path = %db_path,
            "Database connection established (SQLite WAL, busy_timeout=5000ms)"
        );

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }
}

/// Transaction that takes the write lock at `BEGIN IMMEDIATE`.
///
/// Read-then-write transactions must use this: a deferred `BEGIN` fails with
/// SQLITE_BUSY on lock upgrade without waiting on `busy_timeout`.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Whether a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
