//! API routes and handlers
//!
//! Everything here is mounted under `/api`.

use axum::{routing::get, Router};

use crate::AppState;

mod events;
mod health;
mod profiles;
mod timezones;

/// All API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        // Resource endpoints
        .nest("/profiles", profiles::routes())
        .nest("/events", events::routes())
        .nest("/timezones", timezones::routes())
}

/// Parse a path id, rejecting anything that is not a UUID with 400
fn parse_id(id: &str, label: &str) -> Result<uuid::Uuid, crate::utils::AppError> {
    uuid::Uuid::parse_str(id)
        .map_err(|_| crate::utils::AppError::bad_request(format!("Invalid {} ID", label)))
}
