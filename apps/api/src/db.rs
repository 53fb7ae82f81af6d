use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id     TEXT PRIMARY KEY,
        phone       TEXT NOT NULL,
        email       TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_phone ON users(phone)",
    "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id                     INTEGER PRIMARY KEY AUTOINCREMENT,
        transaction_reference  TEXT NOT NULL UNIQUE,
        user_id                TEXT NOT NULL,
        phone_number           TEXT NOT NULL,
        amount                 INTEGER NOT NULL CHECK (amount > 0),
        status                 TEXT NOT NULL DEFAULT 'pending'
                               CHECK (status IN ('pending', 'completed', 'failed')),
        created_at             TEXT NOT NULL,
        updated_at             TEXT NOT NULL,
        completed_at           TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_payments_user_id ON payments(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_user_completed \
     ON payments(user_id, status) WHERE status = 'completed'",
    r#"
    CREATE TABLE IF NOT EXISTS user_outputs (
        user_id          TEXT PRIMARY KEY,
        resume_markdown  TEXT NOT NULL DEFAULT '',
        cover_letter     TEXT NOT NULL DEFAULT '',
        emails_json      TEXT NOT NULL DEFAULT '[]',
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL
    )
    "#,
];

/// Creates and returns a SQLite connection pool. The database file is created if missing.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}...");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates tables and indexes. Idempotent; safe to run on every startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
///
/// Every connection to `sqlite::memory:` is its own database, so the pool
/// must never open a second one or recycle the first.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("valid url");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("in-memory database");
    init_schema(&pool).await.expect("schema");
    pool
}
