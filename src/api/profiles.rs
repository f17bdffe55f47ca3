//! Profile API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::parse_id;
use crate::{
    models::{CreateProfileRequest, Profile, UpdateProfileRequest},
    services::ProfileService,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profiles).post(create_profile))
        .route("/{id}", get(get_profile).put(update_profile))
}

async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, AppError> {
    let profiles = ProfileService::new(&state.db).list().await?;
    Ok(Json(profiles))
}

async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let profile = ProfileService::new(&state.db)
        .create(&req, &state.config.scheduling.default_timezone)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let id = parse_id(&id, "profile")?;
    let profile = ProfileService::new(&state.db).get(id).await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let id = parse_id(&id, "profile")?;
    let profile = ProfileService::new(&state.db).update(id, &req).await?;
    Ok(Json(profile))
}
