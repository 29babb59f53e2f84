//! `/api` routes for seminars and attendees. Seed data is ensured before every request.

use crate::error::AppError;
use crate::handlers::{
    bulk_create_attendees, confirm_breakfast, create_attendee, create_seminar, delete_attendee,
    delete_seminar, export_attendees_csv, import_attendees_csv, list_attendees, list_seminar_attendees,
    list_seminars, read_seminar, search_pending, seminar_summary, update_attendee, update_seminar,
};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};

async fn ensure_seed(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, AppError> {
    state.stores.ensure_seed().await?;
    Ok(next.run(req).await)
}

/// Mount under `/api`.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/seminars", get(list_seminars).post(create_seminar))
        .route(
            "/seminars/:id",
            get(read_seminar).put(update_seminar).delete(delete_seminar),
        )
        .route("/seminars/:id/summary", get(seminar_summary))
        .route(
            "/seminars/:id/attendees",
            get(list_seminar_attendees).post(create_attendee),
        )
        .route("/seminars/:id/attendees/bulk", post(bulk_create_attendees))
        .route("/seminars/:id/attendees/import", post(import_attendees_csv))
        .route("/seminars/:id/attendees/export", get(export_attendees_csv))
        .route("/seminars/:id/attendees/search", get(search_pending))
        .route("/attendees", get(list_attendees))
        .route("/attendees/:id", put(update_attendee).delete(delete_attendee))
        .route("/attendees/:id/confirm-breakfast", post(confirm_breakfast))
        .route_layer(middleware::from_fn_with_state(state.clone(), ensure_seed))
        .with_state(state)
}
