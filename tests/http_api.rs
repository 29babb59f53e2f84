use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use seminar_breakfast::{app, AppState, MemoryBackend};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(seed: bool) -> axum::Router {
    let state = AppState::new(Arc::new(MemoryBackend::new()), seed).expect("state should build");
    app(state, 1024 * 1024)
}

async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<(&str, Vec<u8>)>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some((content_type, payload)) => {
            builder = builder.header("content-type", content_type);
            Body::from(payload)
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request should build"))
        .await
        .expect("response expected");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body should be readable")
        .to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &axum::Router, method: Method, uri: &str, payload: Option<Value>) -> (StatusCode, Value) {
    let body = payload.map(|p| ("application/json", p.to_string().into_bytes()));
    let (status, bytes) = send(app, method, uri, body).await;
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let json = serde_json::from_slice::<Value>(&bytes).expect("body should be valid JSON");
    (status, json)
}

fn ids(data: &Value) -> Vec<String> {
    data.as_array()
        .expect("data should be an array")
        .iter()
        .map(|v| v["id"].as_str().expect("id").to_string())
        .collect()
}

fn seminar_body(start: &str, end: &str) -> Value {
    json!({
        "name": "Hospitality Tech Forum",
        "organizer": "Hotel Group",
        "startDate": start,
        "endDate": end,
        "assignedRoom": "Orion"
    })
}

#[tokio::test]
async fn health_and_ready() {
    let app = router(true);
    let (status, body) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, body) = send_json(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "ok");
}

#[tokio::test]
async fn seed_is_served_once() {
    let app = router(true);
    let (status, first) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(ids(&first["data"]), vec!["sem1", "sem2"]);

    let (_, second) = send_json(&app, Method::GET, "/api/attendees", None).await;
    assert_eq!(second["data"].as_array().unwrap().len(), 8);
    let (_, again) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(ids(&again["data"]), vec!["sem1", "sem2"]);
}

#[tokio::test]
async fn seeding_can_be_disabled() {
    let app = router(false);
    let (status, body) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn create_and_get_seminar() {
    let app = router(true);
    let (status, created) = send_json(
        &app,
        Method::POST,
        "/api/seminars",
        Some(seminar_body("2025-05-01T09:00:00Z", "2025-05-02T17:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().expect("created seminar should have id").to_string();

    let (status, fetched) = send_json(&app, Method::GET, &format!("/api/seminars/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"], created["data"]);
    assert_eq!(fetched["data"]["startDate"], "2025-05-01T09:00:00Z");

    let (_, listed) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(ids(&listed["data"]), vec!["sem1".to_string(), "sem2".to_string(), id]);
}

#[tokio::test]
async fn seminar_with_end_before_start_is_rejected() {
    let app = router(true);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/seminars",
        Some(seminar_body("2025-05-02T09:00:00Z", "2025-05-01T09:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "End date cannot be before start date.");
    assert!(body["details"]["endDate"].is_array());

    let (_, listed) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn short_name_reports_field_error() {
    let app = router(true);
    let mut body = seminar_body("2025-05-01", "2025-05-01");
    body["name"] = json!("ab");
    let (status, res) = send_json(&app, Method::POST, "/api/seminars", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["details"]["name"][0], "Seminar name must be at least 3 characters long.");
}

#[tokio::test]
async fn malformed_json_uses_envelope() {
    let app = router(true);
    let (status, bytes) = send(
        &app,
        Method::POST,
        "/api/seminars",
        Some(("application/json", b"{not json".to_vec())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_seminar_is_404() {
    let app = router(true);
    let (status, body) = send_json(&app, Method::GET, "/api/seminars/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Seminar not found");

    let (status, _) = send_json(
        &app,
        Method::PUT,
        "/api/seminars/nope",
        Some(seminar_body("2025-05-01", "2025-05-02")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, Method::DELETE, "/api/seminars/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(ids(&listed["data"]), vec!["sem1", "sem2"]);
}

#[tokio::test]
async fn update_seminar_replaces_fields() {
    let app = router(true);
    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/seminars/sem1",
        Some(seminar_body("2025-01-01", "2025-01-02")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "sem1");
    assert_eq!(body["data"]["assignedRoom"], "Orion");
    assert_eq!(body["data"]["startDate"], "2025-01-01T00:00:00Z");
}

#[tokio::test]
async fn deleting_seminar_cascades_to_its_attendees() {
    let app = router(true);
    let (status, body) = send_json(&app, Method::DELETE, "/api/seminars/sem1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": "sem1", "attendeesRemoved": 4 }));

    let (_, attendees) = send_json(&app, Method::GET, "/api/attendees", None).await;
    assert_eq!(ids(&attendees["data"]), vec!["att5", "att6", "att7", "att8"]);
    let (_, seminars) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(ids(&seminars["data"]), vec!["sem2"]);
}

#[tokio::test]
async fn create_attendee_defaults_to_pending() {
    let app = router(true);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/seminars/sem2/attendees",
        Some(json!({ "firstName": "Ada", "lastName": "Lovelace", "roomNumber": "512", "breakfastStatus": "Served" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["breakfastStatus"], "Pending");
    assert_eq!(body["data"]["seminarId"], "sem2");

    let (_, roster) = send_json(&app, Method::GET, "/api/seminars/sem2/attendees", None).await;
    assert_eq!(roster["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn bulk_with_missing_room_rejects_everything() {
    let app = router(true);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/seminars/sem1/attendees/bulk",
        Some(json!([
            { "firstName": "A", "lastName": "B", "roomNumber": "1" },
            { "firstName": "C", "lastName": "D" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, roster) = send_json(&app, Method::GET, "/api/seminars/sem1/attendees", None).await;
    assert_eq!(ids(&roster["data"]), vec!["att1", "att2", "att3", "att4"]);
}

#[tokio::test]
async fn bulk_creates_and_reports_count() {
    let app = router(true);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/seminars/sem1/attendees/bulk",
        Some(json!([
            { "firstName": "A", "lastName": "B", "roomNumber": "1" },
            { "firstName": "C", "lastName": "D", "roomNumber": "2" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["count"], 2);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/seminars/sem1/attendees/bulk",
        Some(json!({ "firstName": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_import_and_export() {
    let app = router(true);
    let csv = "firstName,lastName,roomNumber\nLin,Wu,612\nNo,Room,\n".to_string();
    let (status, bytes) = send(
        &app,
        Method::POST,
        "/api/seminars/sem2/attendees/import",
        Some(("text/csv", csv.into_bytes())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"], json!({ "count": 1, "dropped": 1 }));

    let (status, bytes) = send(
        &app,
        Method::POST,
        "/api/seminars/sem2/attendees/import",
        Some(("text/csv", b"first,last\nA,B\n".to_vec())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("missing required headers"));

    let (status, bytes) = send(&app, Method::GET, "/api/seminars/sem2/attendees/export", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "First Name,Last Name,Room Number,Breakfast Status");
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[5], "\"Lin\",\"Wu\",\"612\",\"Pending\"");
}

#[tokio::test]
async fn room_search_and_summary() {
    let app = router(true);
    let (status, hits) = send_json(&app, Method::GET, "/api/seminars/sem2/attendees/search?room=30", None).await;
    assert_eq!(status, StatusCode::OK);
    // att6 in 302 is already served.
    assert_eq!(ids(&hits["data"]), vec!["att5", "att7"]);

    let (_, filtered) = send_json(
        &app,
        Method::GET,
        "/api/seminars/sem1/attendees?status=Served",
        None,
    )
    .await;
    assert_eq!(ids(&filtered["data"]), vec!["att3"]);

    let (status, summary) = send_json(&app, Method::GET, "/api/seminars/sem1/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["data"], json!({ "total": 4, "pending": 3, "served": 1 }));
}

#[tokio::test]
async fn confirm_breakfast_twice_is_idempotent() {
    let app = router(true);
    let (status, first) = send_json(&app, Method::POST, "/api/attendees/att1/confirm-breakfast", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["breakfastStatus"], "Served");

    let (status, second) = send_json(&app, Method::POST, "/api/attendees/att1/confirm-breakfast", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"], first["data"]);

    let (status, missing) = send_json(&app, Method::POST, "/api/attendees/ghost/confirm-breakfast", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["error"], "Attendee not found");
}

#[tokio::test]
async fn update_and_delete_attendee() {
    let app = router(true);
    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/attendees/att6",
        Some(json!({ "firstName": "Francis", "lastName": "Castle", "roomNumber": "310" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roomNumber"], "310");
    assert_eq!(body["data"]["breakfastStatus"], "Served");

    let (status, _) = send_json(
        &app,
        Method::PUT,
        "/api/attendees/att6",
        Some(json!({ "firstName": "", "lastName": "Castle", "roomNumber": "310" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(&app, Method::DELETE, "/api/attendees/att6", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": "att6" }));

    let (status, _) = send_json(&app, Method::DELETE, "/api/attendees/att6", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, all) = send_json(&app, Method::GET, "/api/attendees", None).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn deleting_every_seminar_brings_the_seed_back() {
    let app = router(true);
    for id in ["sem1", "sem2"] {
        let (status, _) = send_json(&app, Method::DELETE, &format!("/api/seminars/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, seminars) = send_json(&app, Method::GET, "/api/seminars", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&seminars["data"]), vec!["sem1", "sem2"]);
    let (_, attendees) = send_json(&app, Method::GET, "/api/attendees", None).await;
    assert_eq!(attendees["data"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn bad_status_filter_uses_envelope() {
    let app = router(true);
    let (status, bytes) = send(&app, Method::GET, "/api/seminars/sem1/attendees?status=Bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).expect("error body should be JSON");
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Bogus"));
}

#[tokio::test]
async fn non_utf8_csv_uses_envelope() {
    let app = router(true);
    let (status, bytes) = send(
        &app,
        Method::POST,
        "/api/seminars/sem1/attendees/import",
        Some(("text/csv", vec![0xff, 0xfe, b'a', b'\n'])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).expect("error body should be JSON");
    assert_eq!(body["success"], false);

    let (_, roster) = send_json(&app, Method::GET, "/api/seminars/sem1/attendees", None).await;
    assert_eq!(roster["data"].as_array().unwrap().len(), 4);
}
