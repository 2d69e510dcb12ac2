use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use olradar_types::api::{VenueQuery, VenuesResponse};

use crate::error::{ApiError, blocking};
use crate::state::AppState;

/// Cap for the plain venue listing (used for name suggestions).
pub const VENUE_LIST_LIMIT: u32 = 100;

/// Treat `?city=` the same as no city.
pub(crate) fn city_param(city: Option<String>) -> Option<String> {
    city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

/// GET /api/venues
pub async fn list_venues(
    State(state): State<AppState>,
    Query(query): Query<VenueQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let city = city_param(query.city);
    let store = state.store.clone();
    let venues = blocking(move || store.fetch_venues(city.as_deref(), VENUE_LIST_LIMIT)).await?;

    Ok(Json(VenuesResponse { venues }))
}

/// GET /api/venues/{venue_id}
pub async fn get_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let venue = blocking(move || store.get_venue(venue_id))
        .await?
        .ok_or(ApiError::NotFound("venue"))?;

    Ok(Json(venue))
}

/// GET /api/venues/{venue_id}/latest
pub async fn latest_observation(
    State(state): State<AppState>,
    Path(venue_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let observation = blocking(move || store.fetch_latest_observation(venue_id))
        .await?
        .ok_or(ApiError::NotFound("observation"))?;

    Ok(Json(observation))
}
