use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use olradar_core::cities::city_center;
use olradar_core::ranking::{pair_with_latest, rank};
use olradar_types::GeoPoint;
use olradar_types::api::{NearbyQuery, NearbyResponse};

use crate::error::{ApiError, blocking};
use crate::state::AppState;
use crate::venues::city_param;

pub const NEARBY_VENUE_LIMIT: u32 = 500;

/// Explicit coordinates win; otherwise the centre of the requested city.
fn viewer_position(query: &NearbyQuery, city: Option<&str>) -> Option<GeoPoint> {
    match (query.lat, query.lng) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(GeoPoint::new(lat, lng)),
        _ => city.and_then(city_center),
    }
}

/// GET /api/nearby
///
/// Venues with their latest deal, filtered by `q` and ordered by `sort`.
pub async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let city = city_param(query.city.clone());
    let viewer = viewer_position(&query, city.as_deref());

    let store = state.store.clone();
    let pairs = blocking(move || {
        let venues = store.fetch_venues(city.as_deref(), NEARBY_VENUE_LIMIT)?;
        let ids: Vec<Uuid> = venues.iter().map(|v| v.id).collect();
        let observations = store.fetch_observations_for_venues(&ids)?;
        Ok(pair_with_latest(venues, observations))
    })
    .await?;

    let now = state.clock.now();
    let items = rank(pairs, query.q.as_deref(), viewer, query.sort, &now);
    debug!("nearby: {} items, sort={:?}, viewer={:?}", items.len(), query.sort, viewer);

    Ok(Json(NearbyResponse { items }))
}
