//! Roster CSV: import preview parsing and breakfast status export.

use crate::domain::Attendee;
use crate::error::AppError;
use crate::service::validation::AttendeePayload;
use serde::Serialize;

pub const REQUIRED_HEADERS: [&str; 3] = ["firstName", "lastName", "roomNumber"];
const EXPORT_HEADERS: [&str; 4] = ["First Name", "Last Name", "Room Number", "Breakfast Status"];

/// Rows that passed the required-field check, plus how many were dropped.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportPreview {
    pub rows: Vec<ImportRow>,
    pub dropped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub first_name: String,
    pub last_name: String,
    pub room_number: String,
}

impl From<ImportRow> for AttendeePayload {
    fn from(row: ImportRow) -> Self {
        AttendeePayload {
            first_name: Some(row.first_name),
            last_name: Some(row.last_name),
            room_number: Some(row.room_number),
        }
    }
}

/// Parse an uploaded roster. The header row must name all of [`REQUIRED_HEADERS`]; other columns are ignored.
/// Rows with a blank required value are dropped.
pub fn parse_import(text: &str) -> Result<ImportPreview, AppError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = parse_records(text)?
        .into_iter()
        .filter(|r| r.iter().any(|f| !f.trim().is_empty()));

    let header = records
        .next()
        .ok_or_else(|| AppError::BadRequest("CSV is empty".into()))?;
    let header: Vec<&str> = header.iter().map(|h| h.trim()).collect();
    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|h| !header.contains(h))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "CSV is missing required headers: {}",
            missing.join(", ")
        )));
    }
    let column = |name: &str| header.iter().position(|h| *h == name);
    let (first, last, room) = match (column("firstName"), column("lastName"), column("roomNumber")) {
        (Some(f), Some(l), Some(r)) => (f, l, r),
        _ => return Err(AppError::BadRequest("CSV header could not be resolved".into())),
    };

    let mut preview = ImportPreview::default();
    for record in records {
        let field = |i: usize| record.get(i).map(|s| s.trim()).unwrap_or("").to_string();
        let row = ImportRow {
            first_name: field(first),
            last_name: field(last),
            room_number: field(room),
        };
        if row.first_name.is_empty() || row.last_name.is_empty() || row.room_number.is_empty() {
            preview.dropped += 1;
            continue;
        }
        preview.rows.push(row);
    }
    if preview.dropped > 0 {
        tracing::warn!(dropped = preview.dropped, kept = preview.rows.len(), "dropped incomplete CSV rows");
    }
    Ok(preview)
}

/// Split CSV text into records. Rows may have differing field counts.
fn parse_records(text: &str) -> Result<Vec<Vec<String>>, AppError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::BadRequest(format!("CSV could not be read: {}", e)))?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

/// Breakfast status report, one quoted line per attendee.
pub fn export_attendees(attendees: &[Attendee]) -> String {
    let mut lines = Vec::with_capacity(attendees.len() + 1);
    lines.push(EXPORT_HEADERS.join(","));
    for a in attendees {
        lines.push(
            [
                quote(&a.first_name),
                quote(&a.last_name),
                quote(&a.room_number),
                quote(a.breakfast_status.as_str()),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{seed_attendees, BreakfastStatus};

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let text = "email,firstName,lastName,roomNumber\r\na@x.io,Ada,Lovelace,12\r\n,\"Grace \"\"Amazing\"\"\",Hopper,\"4,5\"\r\n";
        let preview = parse_import(text).unwrap();
        assert_eq!(preview.dropped, 0);
        assert_eq!(
            preview.rows,
            vec![
                ImportRow {
                    first_name: "Ada".into(),
                    last_name: "Lovelace".into(),
                    room_number: "12".into(),
                },
                ImportRow {
                    first_name: "Grace \"Amazing\"".into(),
                    last_name: "Hopper".into(),
                    room_number: "4,5".into(),
                },
            ]
        );
    }

    #[test]
    fn drops_incomplete_rows_and_blank_lines() {
        let text = "firstName,lastName,roomNumber\nA,B,1\n\nC,D\nE,,3\nF,G,7";
        let preview = parse_import(text).unwrap();
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1].room_number, "7");
        assert_eq!(preview.dropped, 2);
    }

    #[test]
    fn missing_headers_are_listed() {
        let err = parse_import("firstName,room\nA,1").unwrap_err();
        assert_eq!(err.to_string(), "CSV is missing required headers: lastName, roomNumber");
        assert!(parse_import("\n\n").is_err());
    }

    #[test]
    fn byte_order_mark_and_quoted_newlines() {
        let text = "\u{feff}firstName,lastName,roomNumber\n\"Mary\nAnn\",Lee,9\n";
        let preview = parse_import(text).unwrap();
        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.rows[0].first_name, "Mary\nAnn");
        assert_eq!(preview.rows[0].room_number, "9");
    }

    #[test]
    fn export_quotes_every_value() {
        let mut attendees = seed_attendees();
        attendees.truncate(3);
        attendees[0].last_name = "O\"Neil".into();
        let csv = export_attendees(&attendees);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "First Name,Last Name,Room Number,Breakfast Status");
        assert_eq!(lines[1], "\"Alice\",\"O\"\"Neil\",\"101\",\"Pending\"");
        assert_eq!(lines[3], format!("\"Charlie\",\"Brown\",\"103\",\"{}\"", BreakfastStatus::Served));
        assert_eq!(lines.len(), 4);
    }
}
