//! Seminar handlers: list, create, read, update, delete (with attendee cascade).

use crate::error::AppError;
use crate::extractors::ApiJson;
use crate::response::{created, ok, DeletedBody};
use crate::service::{SeminarPayload, SeminarService};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

pub async fn list_seminars(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = SeminarService::list(&state.stores).await?;
    Ok(ok(items))
}

pub async fn create_seminar(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SeminarPayload>,
) -> Result<impl IntoResponse, AppError> {
    let seminar = SeminarService::create(&state.stores, &body).await?;
    Ok(created(seminar))
}

pub async fn read_seminar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(SeminarService::get(&state.stores, &id).await?))
}

pub async fn update_seminar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<SeminarPayload>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(SeminarService::update(&state.stores, &id, &body).await?))
}

pub async fn delete_seminar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = SeminarService::delete(&state.stores, &id).await?;
    Ok(ok(DeletedBody {
        id: deleted.id,
        attendees_removed: Some(deleted.attendees_removed),
    }))
}
