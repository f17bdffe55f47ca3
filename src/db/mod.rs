//! Database layer
//!
//! SQLite storage for:
//! - Profiles
//! - Events and their profile membership
//! - Event audit logs

mod event_log_repository;
mod event_repository;
mod profile_repository;

pub use event_log_repository::EventLogRepository;
pub use event_repository::EventRepository;
pub use profile_repository::ProfileRepository;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database URL: {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Check that the database answers queries
pub async fn check_health(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database health check failed")?;
    Ok(())
}

/// Parse a stored timestamp, accepting both RFC 3339 and SQLite's own format
fn parse_db_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .with_context(|| format!("Invalid stored timestamp: {}", ts))
}

fn parse_db_uuid(id: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(id).with_context(|| format!("Invalid stored id: {}", id))
}

/// Ids bound per `IN (...)` query, well under SQLite's variable limit
const BIND_CHUNK: usize = 500;

/// `?, ?, ?` with `n` placeholders
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
