use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::WeeklySchedule;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    /// Flag as stored upstream. Carried through for completeness only;
    /// open/closed state shown to users is always derived from `hours`.
    pub open_now: Option<bool>,
    pub hours: Option<WeeklySchedule>,
    pub happy_hours: Option<WeeklySchedule>,
}

impl Venue {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub id: Uuid,
    pub name: String,
    pub style: Option<String>,
    pub abv: Option<f64>,
}

/// A single price sighting. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub beer_id: Uuid,
    pub beer: Option<Beer>,
    pub price: f64,
    pub currency: String,
    pub rating: Option<f64>,
    pub photo_url: Option<String>,
    pub user_id: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to append an observation. Venue and beer are
/// referenced by name and resolved (or created) by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub venue_name: String,
    pub beer_name: String,
    pub beer_style: Option<String>,
    pub price: f64,
    pub currency: String,
    pub rating: Option<f64>,
    pub city: Option<String>,
    pub user_id: Option<String>,
    pub photo_url: Option<String>,
    /// Coordinates used if the venue has to be created.
    pub fallback_position: GeoPoint,
}
