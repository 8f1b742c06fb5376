//! Database connection pool and migration management.
//!
//! The store is a single SQLite file. WAL journaling lets verifications read
//! concurrently while a redemption writes, and the busy timeout bounds how
//! long a writer waits for the lock before the operation fails instead of
//! blocking indefinitely.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Create a new SQLite connection pool.
///
/// The database file (and its parent directory) is created on first start.
///
/// # Arguments
///
/// * `database_url` - SQLite connection string, e.g. `sqlite://data/keys.db`
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed or the database file cannot
/// be opened.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    // SQLite creates the file but not the directory it lives in
    if let Some(parent) = database_path(database_url).and_then(|p| p.parent().map(Path::to_path_buf))
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(&parent).map_err(sqlx::Error::Io)?;
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        // WAL keeps readers unblocked while a writer commits
        .journal_mode(SqliteJournalMode::Wal)
        // Bounded lock acquisition: fail after 5s of contention
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        // Limit concurrent connections
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each migration
/// runs only once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}

/// Extract the filesystem path from a `sqlite://` URL, if it names a file.
fn database_path(database_url: &str) -> Option<std::path::PathBuf> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    // Strip query parameters like ?mode=rwc
    let path = path.split('?').next().unwrap_or(path);
    Some(std::path::PathBuf::from(path))
}
