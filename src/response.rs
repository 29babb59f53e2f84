//! Standard response envelope helpers: `{ success, data?, error? }`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Body of bulk operations that only report how many records were written.
#[derive(Serialize)]
pub struct CountBody {
    pub count: usize,
}

/// Body of delete operations.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedBody {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees_removed: Option<usize>,
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            data: Some(data),
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::CREATED,
        Json(Envelope {
            success: true,
            data: Some(data),
        }),
    )
}
