use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::Stream;
use storage::{
    dto::athlete::{AthletePatch, CreatedResponse},
    models::{AthleteRecord, StoredAthlete},
};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/athletes",
    responses(
        (status = 200, description = "List all athletes, newest first", body = Vec<StoredAthlete>)
    ),
    tag = "athletes"
)]
pub async fn list_athletes(State(state): State<AppState>) -> Result<Response, WebError> {
    let athletes = services::list_athletes(state.store.as_ref()).await?;

    Ok(Json(athletes).into_response())
}

#[utoipa::path(
    get,
    path = "/api/athletes/stream",
    responses(
        (status = 200, description = "Server-sent `snapshot` events, each carrying the full list", content_type = "text/event-stream", body = Vec<StoredAthlete>)
    ),
    tag = "athletes"
)]
pub async fn stream_athletes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let receiver = state.store.feed().receiver();
    tracing::debug!("Opening athlete stream");

    Sse::new(services::snapshot_events(receiver)).keep_alive(KeepAlive::default())
}

#[utoipa::path(
    get,
    path = "/api/athletes/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    responses(
        (status = 200, description = "Athlete found", body = StoredAthlete),
        (status = 404, description = "Athlete not found")
    ),
    tag = "athletes"
)]
pub async fn get_athlete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let athlete = services::get_athlete(state.store.as_ref(), id).await?;

    Ok(Json(athlete).into_response())
}

#[utoipa::path(
    post,
    path = "/api/athletes",
    request_body = AthleteRecord,
    responses(
        (status = 201, description = "Athlete created successfully", body = CreatedResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "athletes"
)]
pub async fn create_athlete(
    State(state): State<AppState>,
    Json(record): Json<AthleteRecord>,
) -> Result<Response, WebError> {
    let id = services::create_athlete(&state, record).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })).into_response())
}

#[utoipa::path(
    put,
    path = "/api/athletes/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    request_body = AthletePatch,
    responses(
        (status = 200, description = "Athlete updated successfully", body = StoredAthlete),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Athlete not found"),
        (status = 409, description = "Patch targets the other registration form")
    ),
    tag = "athletes"
)]
pub async fn update_athlete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AthletePatch>,
) -> Result<Response, WebError> {
    let updated = services::update_athlete(&state, id, patch).await?;

    Ok(Json(updated).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/athletes/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    responses(
        (status = 204, description = "Athlete deleted, or already absent")
    ),
    tag = "athletes"
)]
pub async fn delete_athlete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_athlete(state.store.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
