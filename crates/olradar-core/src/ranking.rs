use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, TimeZone};
use uuid::Uuid;

use olradar_types::api::{RankedItem, SortMode};
use olradar_types::{GeoPoint, Observation, Venue};

use crate::geo::distance_km;
use crate::hours::{happy_hour_now, open_now};

/// Reduce a bulk observation fetch to the newest observation per venue.
/// On equal timestamps the one seen first wins.
pub fn latest_per_venue(observations: Vec<Observation>) -> HashMap<Uuid, Observation> {
    let mut latest: HashMap<Uuid, Observation> = HashMap::new();
    for obs in observations {
        match latest.get(&obs.venue_id) {
            Some(current) if current.created_at >= obs.created_at => {}
            _ => {
                latest.insert(obs.venue_id, obs);
            }
        }
    }
    latest
}

/// Pair every venue with its latest observation, keeping venue order.
pub fn pair_with_latest(
    venues: Vec<Venue>,
    observations: Vec<Observation>,
) -> Vec<(Venue, Option<Observation>)> {
    let mut latest = latest_per_venue(observations);
    venues
        .into_iter()
        .map(|venue| {
            let deal = latest.remove(&venue.id);
            (venue, deal)
        })
        .collect()
}

/// Case-insensitive substring match on name, address and city.
pub fn matches_query(venue: &Venue, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let haystack = format!("{} {} {}", venue.name, venue.address, venue.city).to_lowercase();
    haystack.contains(&query)
}

fn by_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY)
        .total_cmp(&b.unwrap_or(f64::INFINITY))
}

/// Stable sort; missing keys sort last.
pub fn sort_items(items: &mut [RankedItem], mode: SortMode) {
    match mode {
        SortMode::Standard => {}
        SortMode::Cheapest => items.sort_by(|a, b| {
            by_missing_last(a.deal.as_ref().map(|d| d.price), b.deal.as_ref().map(|d| d.price))
        }),
        SortMode::Nearest => items.sort_by(|a, b| by_missing_last(a.distance_km, b.distance_km)),
    }
}

/// Filter, annotate and order the deal list.
///
/// Every item gets its distance from `viewer` (when known) and its
/// open/happy-hour state at `now`.
pub fn rank<Tz: TimeZone>(
    pairs: Vec<(Venue, Option<Observation>)>,
    query: Option<&str>,
    viewer: Option<GeoPoint>,
    sort: SortMode,
    now: &DateTime<Tz>,
) -> Vec<RankedItem> {
    let query = query.unwrap_or_default();

    let mut items: Vec<RankedItem> = pairs
        .into_iter()
        .filter(|(venue, _)| matches_query(venue, query))
        .map(|(venue, deal)| {
            let distance_km = viewer.map(|v| distance_km(v, venue.position()));
            let open_now = open_now(venue.hours.as_ref(), now);
            let happy_hour = happy_hour_now(
                venue.happy_hours.as_ref(),
                deal.as_ref().map(|d| d.price),
                now,
            );
            RankedItem {
                venue,
                deal,
                distance_km,
                open_now,
                happy_hour,
            }
        })
        .collect();

    sort_items(&mut items, sort);
    items
}
