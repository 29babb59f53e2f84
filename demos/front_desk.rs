//! Front-desk walkthrough against the in-memory store: import a roster, look up a room, serve breakfast, export.
//!
//! Run: `cargo run --example front_desk`

use seminar_breakfast::service::{AttendeeService, SeminarPayload, SeminarService};
use seminar_breakfast::{AppState, MemoryBackend};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ROSTER: &str = "firstName,lastName,roomNumber\nLin,Wu,612\nSam,Ortiz,614\nNo,Room,\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("seminar_breakfast=info".parse()?))
        .init();

    let state = AppState::new(Arc::new(MemoryBackend::new()), false)?;
    let stores = &state.stores;

    let seminar = SeminarService::create(
        stores,
        &SeminarPayload {
            name: Some("Regional Sales Kickoff".into()),
            organizer: Some("Northwind".into()),
            start_date: Some("2025-02-03T08:00:00Z".into()),
            end_date: Some("2025-02-04T16:00:00Z".into()),
            assigned_room: Some("Atrium".into()),
        },
    )
    .await?;

    let imported = AttendeeService::import_csv(stores, &seminar.id, ROSTER).await?;
    println!("imported {} attendees ({} rows dropped)", imported.count, imported.dropped);

    let hits = AttendeeService::search_pending(stores, &seminar.id, "61").await?;
    for a in &hits {
        println!("room {}: {} {} ({})", a.room_number, a.first_name, a.last_name, a.breakfast_status);
    }
    if let Some(first) = hits.first() {
        AttendeeService::confirm_breakfast(stores, &first.id).await?;
    }

    let summary = AttendeeService::summary(stores, &seminar.id).await?;
    println!("pending {} / served {} / total {}", summary.pending, summary.served, summary.total);

    let (_, csv) = AttendeeService::export_csv(stores, &seminar.id).await?;
    println!("{}", csv);
    Ok(())
}
