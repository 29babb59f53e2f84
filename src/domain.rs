//! Seminar and attendee records, their store configs, and the demo seed roster.

use crate::config::{Entity, EntityConfig};
use crate::error::AppError;
use crate::store::EntityRef;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seminar {
    pub id: String,
    pub name: String,
    pub organizer: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub assigned_room: String,
}

impl Entity for Seminar {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Pending until breakfast is confirmed; Served is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakfastStatus {
    #[default]
    Pending,
    Served,
}

impl BreakfastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakfastStatus::Pending => "Pending",
            BreakfastStatus::Served => "Served",
        }
    }
}

impl fmt::Display for BreakfastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: String,
    pub seminar_id: String,
    pub first_name: String,
    pub last_name: String,
    pub room_number: String,
    #[serde(default)]
    pub breakfast_status: BreakfastStatus,
}

impl Entity for Attendee {
    fn id(&self) -> &str {
        &self.id
    }
}

impl EntityRef<'_, Attendee> {
    /// Mark breakfast as served. Calling it again leaves the record unchanged.
    pub async fn confirm_breakfast(&self) -> Result<Attendee, AppError> {
        self.mutate(|a| Attendee {
            breakfast_status: BreakfastStatus::Served,
            ..a
        })
        .await
    }
}

pub fn seminar_config() -> EntityConfig<Seminar> {
    EntityConfig::new("seminar", "seminars", Seminar::default()).with_seed(seed_seminars())
}

pub fn attendee_config() -> EntityConfig<Attendee> {
    EntityConfig::new("attendee", "attendees", Attendee::default()).with_seed(seed_attendees())
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap_or_default()
}

pub fn seed_seminars() -> Vec<Seminar> {
    vec![
        Seminar {
            id: "sem1".into(),
            name: "Cloudflare Connect 2024".into(),
            organizer: "Cloudflare Inc.".into(),
            start_date: at(2024, 10, 5, 9, 0),
            end_date: at(2024, 10, 7, 17, 0),
            assigned_room: "Grand Ballroom".into(),
        },
        Seminar {
            id: "sem2".into(),
            name: "Future of Web Development".into(),
            organizer: "Tech Conferences LLC".into(),
            start_date: at(2024, 11, 12, 8, 30),
            end_date: at(2024, 11, 14, 18, 0),
            assigned_room: "Neptune Hall".into(),
        },
    ]
}

pub fn seed_attendees() -> Vec<Attendee> {
    use BreakfastStatus::{Pending, Served};
    [
        ("att1", "sem1", "Alice", "Johnson", "101", Pending),
        ("att2", "sem1", "Bob", "Smith", "102", Pending),
        ("att3", "sem1", "Charlie", "Brown", "103", Served),
        ("att4", "sem1", "Diana", "Prince", "201", Pending),
        ("att5", "sem2", "Eve", "Adams", "301", Pending),
        ("att6", "sem2", "Frank", "Castle", "302", Served),
        ("att7", "sem2", "Grace", "Hopper", "305", Pending),
        ("att8", "sem2", "Heidi", "Klum", "404", Pending),
    ]
    .into_iter()
    .map(|(id, seminar_id, first, last, room, status)| Attendee {
        id: id.into(),
        seminar_id: seminar_id.into(),
        first_name: first.into(),
        last_name: last.into(),
        room_number: room.into(),
        breakfast_status: status,
    })
    .collect()
}
