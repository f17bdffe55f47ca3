//! Event API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::parse_id;
use crate::{
    models::{
        AuditLogEntry, CreateEventRequest, DisplayQuery, Event, EventDisplay, EventQuery,
        UpdateEventRequest,
    },
    services::EventService,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/{id}/logs", get(get_event_logs))
        .route("/{id}/display", get(display_event))
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = EventService::new(&state.db).list(&query).await?;
    Ok(Json(events))
}

async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = EventService::new(&state.db).create(&req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let id = parse_id(&id, "event")?;
    let event = EventService::new(&state.db).get(id).await?;
    Ok(Json(event))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, AppError> {
    let id = parse_id(&id, "event")?;
    let event = EventService::new(&state.db).update(id, &req).await?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id, "event")?;
    EventService::new(&state.db).delete(id).await?;
    Ok(Json(serde_json::json!({"message": "Event deleted successfully"})))
}

async fn get_event_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AuditLogEntry>>, AppError> {
    let id = parse_id(&id, "event")?;
    let logs = EventService::new(&state.db).logs(id).await?;
    Ok(Json(logs))
}

async fn display_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DisplayQuery>,
) -> Result<Json<EventDisplay>, AppError> {
    let id = parse_id(&id, "event")?;
    let display = EventService::new(&state.db).display(id, &query).await?;
    Ok(Json(display))
}
