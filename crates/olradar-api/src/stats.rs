use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use olradar_core::game::{group_by_contributor, user_stat, user_stats};
use olradar_core::leaderboard::{week_start, weekly_leaderboard};
use olradar_db::ObservationFilter;
use olradar_types::api::LeaderboardResponse;

use crate::error::{ApiError, blocking};
use crate::state::AppState;

fn window_filter(state: &AppState, user_id: Option<String>) -> ObservationFilter {
    let since = state.clock.now() - Duration::days(state.stats_window_days);
    ObservationFilter {
        user_id,
        since: Some(since.with_timezone(&Utc)),
    }
}

/// GET /api/stats/{user_id}
///
/// Level, badge and streak for one contributor. Unknown contributors get
/// an all-zero stat rather than a 404.
pub async fn get_user_stat(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = window_filter(&state, Some(user_id.clone()));
    let store = state.store.clone();
    let observations = blocking(move || store.fetch_observations(&filter)).await?;

    let dates: Vec<_> = observations.iter().map(|o| o.created_at).collect();
    Ok(Json(user_stat(&user_id, &dates, &state.clock.now())))
}

/// GET /api/stats
pub async fn list_user_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let filter = window_filter(&state, None);
    let store = state.store.clone();
    let observations = blocking(move || store.fetch_observations(&filter)).await?;

    Ok(Json(user_stats(&observations, &state.clock.now())))
}

/// GET /api/leaderboard
pub async fn leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let now = state.clock.now();
    let start = week_start(&now);

    let store = state.store.clone();
    let filter = ObservationFilter {
        user_id: None,
        since: Some(start),
    };
    let observations = blocking(move || store.fetch_observations(&filter)).await?;

    let entries = weekly_leaderboard(&group_by_contributor(&observations), &now);
    Ok(Json(LeaderboardResponse {
        week_start: start,
        entries,
    }))
}
