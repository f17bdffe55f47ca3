//! Timezone catalogue endpoints

use axum::{extract::Path, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::{
    services::timezone::{self, ZoneInfo, COMMON_TIMEZONES},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_timezones))
        .route("/{*zone}", get(get_zone))
}

/// A catalogue entry with the abbreviation currently in force
#[derive(Debug, Serialize)]
pub struct TimezoneOption {
    pub value: &'static str,
    pub label: &'static str,
    pub region: &'static str,
    pub abbreviation: String,
}

async fn list_timezones() -> Result<Json<Vec<TimezoneOption>>, AppError> {
    let now = Utc::now();
    let options = COMMON_TIMEZONES
        .iter()
        .map(|entry| {
            Ok(TimezoneOption {
                value: entry.value,
                label: entry.label,
                region: entry.region,
                abbreviation: timezone::abbreviation(entry.value, now)?,
            })
        })
        .collect::<Result<Vec<_>, timezone::TimezoneError>>()
        .map_err(|e| {
            tracing::error!("Timezone catalogue is inconsistent: {}", e);
            AppError::internal("Failed to list timezones")
        })?;

    Ok(Json(options))
}

/// Any IANA id, including three-segment ones such as
/// `America/Argentina/Buenos_Aires`
async fn get_zone(Path(zone): Path<String>) -> Result<Json<ZoneInfo>, AppError> {
    timezone::zone_info(&zone, Utc::now())
        .map(Json)
        .map_err(|e| AppError::bad_request(e.to_string()))
}
