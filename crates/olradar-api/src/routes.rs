use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::photos::{self, MAX_PHOTO_SIZE};
use crate::state::AppState;
use crate::{log, nearby, stats, venues};

/// Room for the form fields on top of a full-size photo.
const LOG_BODY_LIMIT: usize = MAX_PHOTO_SIZE + 2 * 1024 * 1024;

/// All HTTP routes. Cross-cutting layers (CORS, tracing) are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/venues", get(venues::list_venues))
        .route("/venues/{venue_id}", get(venues::get_venue))
        .route("/venues/{venue_id}/latest", get(venues::latest_observation))
        .route("/nearby", get(nearby::nearby))
        .route(
            "/log",
            post(log::submit_log).layer(DefaultBodyLimit::max(LOG_BODY_LIMIT)),
        )
        .route("/stats", get(stats::list_user_stats))
        .route("/stats/{user_id}", get(stats::get_user_stat))
        .route("/leaderboard", get(stats::leaderboard));

    Router::new()
        .nest("/api", api)
        .route("/photos/{file_name}", get(photos::get_photo))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
