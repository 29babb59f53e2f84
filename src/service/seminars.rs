//! Seminar operations, including the attendee cascade on delete.

use crate::domain::Seminar;
use crate::error::AppError;
use crate::service::validation::{RequestValidator, SeminarPayload};
use crate::state::Stores;
use serde_json::json;

/// What a seminar delete removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletedSeminar {
    pub id: String,
    pub attendees_removed: usize,
}

pub struct SeminarService;

impl SeminarService {
    pub async fn list(stores: &Stores) -> Result<Vec<Seminar>, AppError> {
        Ok(stores.seminars.list().await?.items)
    }

    pub async fn create(stores: &Stores, body: &SeminarPayload) -> Result<Seminar, AppError> {
        let fields = RequestValidator::seminar(body)?;
        let seminar = Seminar {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            organizer: fields.organizer,
            start_date: fields.start_date,
            end_date: fields.end_date,
            assigned_room: fields.assigned_room,
        };
        let seminar = stores.seminars.create(seminar).await?;
        tracing::info!(seminar_id = %seminar.id, name = %seminar.name, "seminar created");
        Ok(seminar)
    }

    pub async fn get(stores: &Stores, id: &str) -> Result<Seminar, AppError> {
        stores.seminars.get(id).await?.ok_or_else(not_found)
    }

    /// Replace every editable field. The body is validated before the record is looked up.
    pub async fn update(stores: &Stores, id: &str, body: &SeminarPayload) -> Result<Seminar, AppError> {
        let fields = RequestValidator::seminar(body)?;
        let seminar = stores.seminars.entity(id);
        if !seminar.exists().await? {
            return Err(not_found());
        }
        seminar
            .patch(json!({
                "name": fields.name,
                "organizer": fields.organizer,
                "startDate": fields.start_date,
                "endDate": fields.end_date,
                "assignedRoom": fields.assigned_room,
            }))
            .await
    }

    /// Delete the seminar, then every attendee referencing it. The two steps are separate writes.
    pub async fn delete(stores: &Stores, id: &str) -> Result<DeletedSeminar, AppError> {
        if !stores.seminars.delete(id).await? {
            return Err(not_found());
        }
        let orphaned: Vec<String> = stores
            .attendees
            .list()
            .await?
            .items
            .into_iter()
            .filter(|a| a.seminar_id == id)
            .map(|a| a.id)
            .collect();
        let attendees_removed = stores.attendees.delete_many(&orphaned).await?;
        tracing::info!(seminar_id = %id, attendees_removed, "seminar deleted");
        Ok(DeletedSeminar {
            id: id.to_string(),
            attendees_removed,
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Seminar not found".into())
}
