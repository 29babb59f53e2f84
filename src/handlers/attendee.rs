//! Attendee handlers: roster listing and search, create, bulk and CSV import, update, delete, confirm breakfast, export.

use crate::error::AppError;
use crate::extractors::{ApiJson, ApiQuery, ApiText};
use crate::response::{created, ok, CountBody, DeletedBody};
use crate::service::{AttendeeFilter, AttendeePayload, AttendeeService};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct RoomQuery {
    #[serde(default)]
    pub room: String,
}

pub async fn list_attendees(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(AttendeeService::list_all(&state.stores).await?))
}

pub async fn list_seminar_attendees(
    State(state): State<AppState>,
    Path(seminar_id): Path<String>,
    ApiQuery(filter): ApiQuery<AttendeeFilter>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(AttendeeService::list_for_seminar(&state.stores, &seminar_id, &filter).await?))
}

pub async fn search_pending(
    State(state): State<AppState>,
    Path(seminar_id): Path<String>,
    ApiQuery(q): ApiQuery<RoomQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(AttendeeService::search_pending(&state.stores, &seminar_id, &q.room).await?))
}

pub async fn seminar_summary(
    State(state): State<AppState>,
    Path(seminar_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(AttendeeService::summary(&state.stores, &seminar_id).await?))
}

pub async fn create_attendee(
    State(state): State<AppState>,
    Path(seminar_id): Path<String>,
    ApiJson(body): ApiJson<AttendeePayload>,
) -> Result<impl IntoResponse, AppError> {
    Ok(created(AttendeeService::create(&state.stores, &seminar_id, &body).await?))
}

pub async fn bulk_create_attendees(
    State(state): State<AppState>,
    Path(seminar_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let Value::Array(items) = body else {
        return Err(AppError::BadRequest("Request body must be an array of attendees.".into()));
    };
    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let row: AttendeePayload = serde_json::from_value(item)
            .map_err(|e| AppError::BadRequest(format!("Invalid attendee data in row {}: {}", i + 1, e)))?;
        rows.push(row);
    }
    let count = AttendeeService::bulk_create(&state.stores, &seminar_id, &rows).await?;
    Ok(created(CountBody { count }))
}

/// Body is the raw CSV text.
pub async fn import_attendees_csv(
    State(state): State<AppState>,
    Path(seminar_id): Path<String>,
    ApiText(body): ApiText,
) -> Result<impl IntoResponse, AppError> {
    Ok(created(AttendeeService::import_csv(&state.stores, &seminar_id, &body).await?))
}

pub async fn export_attendees_csv(
    State(state): State<AppState>,
    Path(seminar_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (name, csv) = AttendeeService::export_csv(&state.stores, &seminar_id).await?;
    let disposition = format!("attachment; filename=\"{}.csv\"", file_stem(&name));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

pub async fn update_attendee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AttendeePayload>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(AttendeeService::update(&state.stores, &id, &body).await?))
}

pub async fn delete_attendee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    AttendeeService::delete(&state.stores, &id).await?;
    Ok(ok(DeletedBody {
        id,
        attendees_removed: None,
    }))
}

pub async fn confirm_breakfast(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(AttendeeService::confirm_breakfast(&state.stores, &id).await?))
}

/// Seminar name reduced to a safe download file name.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if stem.is_empty() {
        "breakfast-report".into()
    } else {
        format!("{}-breakfast-report", stem)
    }
}
