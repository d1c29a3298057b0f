//! SQLite connection pool and schema migrations

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};

use crate::{config::DatabaseConfig, error::AppResult};

/// Embedded migrations, applied on every connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open the database named by the configuration, creating the file if needed.
pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let options = base_options(SqliteConnectOptions::from_str(&config.url)?)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Open a private in-memory database (used by tests).
///
/// An in-memory database lives as long as its connection, so the pool is
/// limited to one connection that is never recycled.
pub async fn connect_in_memory() -> AppResult<SqlitePool> {
    let options = base_options(SqliteConnectOptions::new().filename(":memory:"));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

fn base_options(options: SqliteConnectOptions) -> SqliteConnectOptions {
    options
        .foreign_keys(true)
        .synchronous(SqliteSynchronous::Normal)
        // Writers queue behind each other instead of failing immediately
        .busy_timeout(Duration::from_millis(1500))
}

async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
    tracing::debug!("Database migrations completed");
    Ok(())
}
