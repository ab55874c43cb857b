use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/people/:person/entries", post(handlers::save_entry_form))
        .route("/api/people", get(handlers::list_people))
        .route("/api/people/:person/summary", get(handlers::get_summary))
        .route("/api/people/:person/entries", post(handlers::save_entry))
        .route("/api/people/:person/entries/:date", delete(handlers::delete_entry))
        .route("/api/people/:person/window", put(handlers::set_window))
        .route("/api/people/:person/axis", post(handlers::set_axis))
        .route("/api/people/:person/axis/reset", post(handlers::reset_axis))
        .route(
            "/api/reminder",
            get(handlers::get_reminder).post(handlers::toggle_reminder),
        )
        .with_state(state)
}
