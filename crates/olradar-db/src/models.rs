//! Database row types. These map directly to SQLite rows and are converted
//! into the shared models at the edge of this crate, so nothing above the
//! store ever sees a half-joined row.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tracing::warn;
use uuid::Uuid;

use olradar_types::{Beer, Observation, Venue, WeeklySchedule};

pub struct VenueRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub open_now: Option<bool>,
    pub hours: Option<String>,
    pub happy_hours: Option<String>,
}

pub struct BeerRow {
    pub id: String,
    pub name: String,
    pub style: Option<String>,
    pub abv: Option<f64>,
}

pub struct ObservationRow {
    pub id: String,
    pub venue_id: String,
    pub beer_id: String,
    pub price: f64,
    pub currency: String,
    pub rating: Option<f64>,
    pub user_id: Option<String>,
    pub photo_url: Option<String>,
    pub verified: bool,
    pub created_at: String,
    /// Present only when the joined beer row exists.
    pub beer: Option<BeerRow>,
}

pub const VENUE_COLUMNS: &str =
    "id, name, address, city, country, lat, lng, open_now, hours, happy_hours";

pub const OBSERVATION_COLUMNS: &str = "p.id, p.venue_id, p.beer_id, p.price, p.currency, p.rating, \
     p.user_id, p.photo_url, p.verified, p.created_at, b.id, b.name, b.style, b.abv";

impl VenueRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            address: row.get(2)?,
            city: row.get(3)?,
            country: row.get(4)?,
            lat: row.get(5)?,
            lng: row.get(6)?,
            open_now: row.get(7)?,
            hours: row.get(8)?,
            happy_hours: row.get(9)?,
        })
    }

    pub fn into_model(self) -> Venue {
        Venue {
            id: parse_id(&self.id, "venue"),
            hours: self.hours.as_deref().and_then(WeeklySchedule::from_json_lenient),
            happy_hours: self.happy_hours.as_deref().and_then(WeeklySchedule::from_json_lenient),
            name: self.name,
            address: self.address,
            city: self.city,
            country: self.country,
            lat: self.lat,
            lng: self.lng,
            open_now: self.open_now,
        }
    }
}

impl BeerRow {
    pub fn into_model(self) -> Beer {
        Beer {
            id: parse_id(&self.id, "beer"),
            name: self.name,
            style: self.style,
            abv: self.abv,
        }
    }
}

impl ObservationRow {
    /// Expects the column order of [`OBSERVATION_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let beer_id: Option<String> = row.get(10)?;
        let beer = match beer_id {
            Some(id) => Some(BeerRow {
                id,
                name: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
                style: row.get(12)?,
                abv: row.get(13)?,
            }),
            None => None,
        };

        Ok(Self {
            id: row.get(0)?,
            venue_id: row.get(1)?,
            beer_id: row.get(2)?,
            price: row.get(3)?,
            currency: row.get(4)?,
            rating: row.get(5)?,
            user_id: row.get(6)?,
            photo_url: row.get(7)?,
            verified: row.get(8)?,
            created_at: row.get(9)?,
            beer,
        })
    }

    pub fn into_model(self) -> Observation {
        Observation {
            id: parse_id(&self.id, "observation"),
            venue_id: parse_id(&self.venue_id, "venue"),
            beer_id: parse_id(&self.beer_id, "beer"),
            beer: self.beer.map(BeerRow::into_model),
            price: self.price,
            currency: self.currency,
            rating: self.rating,
            photo_url: self.photo_url,
            user_id: self.user_id,
            verified: self.verified,
            created_at: parse_timestamp(&self.created_at, &self.id),
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// Timestamps are written by [`format_timestamp`]; rows inserted by hand may
/// carry SQLite's `YYYY-MM-DD HH:MM:SS` form instead.
pub fn parse_timestamp(raw: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on row '{}': {}", raw, row_id, e);
            DateTime::default()
        })
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}
