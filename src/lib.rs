//! tzcal library
//!
//! Multi-timezone event scheduling with a field-level audit trail of edits.
//! Wall-clock input is normalized to absolute instants on the way in and
//! re-projected into any viewer's timezone on the way out.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
}
