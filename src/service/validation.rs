//! Request validation for seminar and attendee payloads. All field errors are collected before failing.

use crate::error::{AppError, FieldErrors};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Seminar create/update body. Fields are optional here so missing ones produce field errors, not parse errors.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeminarPayload {
    pub name: Option<String>,
    pub organizer: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub assigned_room: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeminarFields {
    pub name: String,
    pub organizer: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub assigned_room: String,
}

/// Attendee create/update body, also one row of a bulk import.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendeePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub room_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttendeeFields {
    pub first_name: String,
    pub last_name: String,
    pub room_number: String,
}

pub struct RequestValidator;

impl RequestValidator {
    pub fn seminar(body: &SeminarPayload) -> Result<SeminarFields, AppError> {
        let mut errors = FieldErrors::new();
        let name = min_chars(&mut errors, "name", &body.name, 3, "Seminar name must be at least 3 characters long.");
        let organizer = min_chars(
            &mut errors,
            "organizer",
            &body.organizer,
            2,
            "Organizer name must be at least 2 characters long.",
        );
        let start_date = date(&mut errors, "startDate", &body.start_date, "Start date is required.");
        let end_date = date(&mut errors, "endDate", &body.end_date, "End date is required.");
        let assigned_room = min_chars(&mut errors, "assignedRoom", &body.assigned_room, 1, "Assigned room is required.");

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                push(&mut errors, "endDate", "End date cannot be before start date.");
            }
        }

        match (name, organizer, start_date, end_date, assigned_room) {
            (Some(name), Some(organizer), Some(start_date), Some(end_date), Some(assigned_room)) if errors.is_empty() => {
                Ok(SeminarFields {
                    name,
                    organizer,
                    start_date,
                    end_date,
                    assigned_room,
                })
            }
            _ => Err(AppError::invalid(errors)),
        }
    }

    pub fn attendee(body: &AttendeePayload) -> Result<AttendeeFields, AppError> {
        let mut errors = FieldErrors::new();
        let first_name = min_chars(&mut errors, "firstName", &body.first_name, 1, "First name is required.");
        let last_name = min_chars(&mut errors, "lastName", &body.last_name, 1, "Last name is required.");
        let room_number = min_chars(&mut errors, "roomNumber", &body.room_number, 1, "Room number is required.");
        match (first_name, last_name, room_number) {
            (Some(first_name), Some(last_name), Some(room_number)) => Ok(AttendeeFields {
                first_name,
                last_name,
                room_number,
            }),
            _ => Err(AppError::invalid(errors)),
        }
    }

    /// Validate every row; the first invalid row fails the whole batch, naming its position.
    pub fn attendee_batch(rows: &[AttendeePayload]) -> Result<Vec<AttendeeFields>, AppError> {
        let mut out = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match Self::attendee(row) {
                Ok(fields) => out.push(fields),
                Err(AppError::Validation { message, details }) => {
                    let details = details
                        .into_iter()
                        .map(|(field, msgs)| (format!("[{}].{}", i, field), msgs))
                        .collect();
                    return Err(AppError::Validation {
                        message: format!("Invalid attendee data in row {}: {}", i + 1, message),
                        details,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.entry(field.to_string()).or_default().push(message.to_string());
}

fn min_chars(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<String>,
    min: usize,
    message: &str,
) -> Option<String> {
    let trimmed = value.as_deref().map(str::trim).unwrap_or("");
    if trimmed.chars().count() < min {
        push(errors, field, message);
        return None;
    }
    Some(trimmed.to_string())
}

fn date(errors: &mut FieldErrors, field: &str, value: &Option<String>, required: &str) -> Option<DateTime<Utc>> {
    let raw = value.as_deref().map(str::trim).unwrap_or("");
    if raw.is_empty() {
        push(errors, field, required);
        return None;
    }
    let parsed = parse_instant(raw);
    if parsed.is_none() {
        push(errors, field, "Invalid date.");
    }
    parsed
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) and `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}
