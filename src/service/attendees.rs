//! Attendee roster operations: CRUD, bulk and CSV import, room search, breakfast confirmation.

use crate::domain::{Attendee, BreakfastStatus};
use crate::error::AppError;
use crate::service::csv::{self, ImportPreview};
use crate::service::validation::{AttendeeFields, AttendeePayload, RequestValidator};
use crate::service::SeminarService;
use crate::state::Stores;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Optional narrowing for a seminar's roster. `room` matches as a substring of the room number.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AttendeeFilter {
    pub room: Option<String>,
    pub status: Option<BreakfastStatus>,
}

impl AttendeeFilter {
    fn matches(&self, a: &Attendee) -> bool {
        let room_ok = match self.room.as_deref().map(str::trim) {
            Some(room) if !room.is_empty() => a.room_number.contains(room),
            _ => true,
        };
        room_ok && self.status.map_or(true, |s| a.breakfast_status == s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BreakfastSummary {
    pub total: usize,
    pub pending: usize,
    pub served: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub count: usize,
    pub dropped: usize,
}

pub struct AttendeeService;

impl AttendeeService {
    pub async fn list_all(stores: &Stores) -> Result<Vec<Attendee>, AppError> {
        Ok(stores.attendees.list().await?.items)
    }

    pub async fn list_for_seminar(
        stores: &Stores,
        seminar_id: &str,
        filter: &AttendeeFilter,
    ) -> Result<Vec<Attendee>, AppError> {
        Ok(Self::list_all(stores)
            .await?
            .into_iter()
            .filter(|a| a.seminar_id == seminar_id && filter.matches(a))
            .collect())
    }

    /// Front-desk lookup: attendees still waiting for breakfast whose room number contains `room`.
    /// A blank room returns nothing.
    pub async fn search_pending(stores: &Stores, seminar_id: &str, room: &str) -> Result<Vec<Attendee>, AppError> {
        if room.trim().is_empty() {
            return Ok(Vec::new());
        }
        let filter = AttendeeFilter {
            room: Some(room.to_string()),
            status: Some(BreakfastStatus::Pending),
        };
        Self::list_for_seminar(stores, seminar_id, &filter).await
    }

    pub async fn summary(stores: &Stores, seminar_id: &str) -> Result<BreakfastSummary, AppError> {
        SeminarService::get(stores, seminar_id).await?;
        let roster = Self::list_for_seminar(stores, seminar_id, &AttendeeFilter::default()).await?;
        let served = roster
            .iter()
            .filter(|a| a.breakfast_status == BreakfastStatus::Served)
            .count();
        Ok(BreakfastSummary {
            total: roster.len(),
            pending: roster.len() - served,
            served,
        })
    }

    /// CSV report for one seminar. Returns the seminar name (for the file name) and the CSV text.
    pub async fn export_csv(stores: &Stores, seminar_id: &str) -> Result<(String, String), AppError> {
        let seminar = SeminarService::get(stores, seminar_id).await?;
        let roster = Self::list_for_seminar(stores, seminar_id, &AttendeeFilter::default()).await?;
        Ok((seminar.name, csv::export_attendees(&roster)))
    }

    /// New attendees always start Pending. The seminar id is not checked against existing seminars.
    pub async fn create(stores: &Stores, seminar_id: &str, body: &AttendeePayload) -> Result<Attendee, AppError> {
        let fields = RequestValidator::attendee(body)?;
        stores.attendees.create(new_attendee(seminar_id, fields)).await
    }

    /// Validate every row, then write all of them in one batch. Any invalid row rejects the batch.
    pub async fn bulk_create(stores: &Stores, seminar_id: &str, rows: &[AttendeePayload]) -> Result<usize, AppError> {
        let fields = RequestValidator::attendee_batch(rows)?;
        if fields.is_empty() {
            return Ok(0);
        }
        let records: Vec<Attendee> = fields.into_iter().map(|f| new_attendee(seminar_id, f)).collect();
        let created = stores.attendees.create_many(records).await?;
        tracing::info!(seminar_id = %seminar_id, count = created.len(), "attendees imported");
        Ok(created.len())
    }

    /// Parse a roster CSV, drop incomplete rows, and bulk-create the rest.
    pub async fn import_csv(stores: &Stores, seminar_id: &str, text: &str) -> Result<ImportOutcome, AppError> {
        let ImportPreview { rows, dropped } = csv::parse_import(text)?;
        let rows: Vec<AttendeePayload> = rows.into_iter().map(AttendeePayload::from).collect();
        let count = Self::bulk_create(stores, seminar_id, &rows).await?;
        Ok(ImportOutcome { count, dropped })
    }

    /// Update name and room. Breakfast status and seminar are left as they are.
    pub async fn update(stores: &Stores, id: &str, body: &AttendeePayload) -> Result<Attendee, AppError> {
        let fields = RequestValidator::attendee(body)?;
        let attendee = stores.attendees.entity(id);
        if !attendee.exists().await? {
            return Err(not_found());
        }
        attendee
            .patch(json!({
                "firstName": fields.first_name,
                "lastName": fields.last_name,
                "roomNumber": fields.room_number,
            }))
            .await
    }

    pub async fn delete(stores: &Stores, id: &str) -> Result<(), AppError> {
        if !stores.attendees.delete(id).await? {
            return Err(not_found());
        }
        Ok(())
    }

    pub async fn confirm_breakfast(stores: &Stores, id: &str) -> Result<Attendee, AppError> {
        let attendee = stores.attendees.entity(id);
        if !attendee.exists().await? {
            return Err(not_found());
        }
        let served = attendee.confirm_breakfast().await?;
        tracing::info!(attendee_id = %id, room = %served.room_number, "breakfast served");
        Ok(served)
    }
}

fn new_attendee(seminar_id: &str, fields: AttendeeFields) -> Attendee {
    Attendee {
        id: uuid::Uuid::new_v4().to_string(),
        seminar_id: seminar_id.to_string(),
        first_name: fields.first_name,
        last_name: fields.last_name,
        room_number: fields.room_number,
        breakfast_status: BreakfastStatus::Pending,
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Attendee not found".into())
}
