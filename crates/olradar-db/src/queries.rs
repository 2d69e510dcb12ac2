use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::info;
use uuid::Uuid;

use olradar_types::{NewObservation, Observation, Venue};

use crate::Database;
use crate::models::{
    OBSERVATION_COLUMNS, ObservationRow, VENUE_COLUMNS, VenueRow, format_timestamp,
};
use crate::store::ObservationFilter;

impl Database {
    // -- Venues --

    pub fn list_venues(&self, city: Option<&str>, limit: u32) -> Result<Vec<Venue>> {
        self.with_conn(|conn| query_venues(conn, city, limit))
    }

    pub fn venue_by_id(&self, id: &str) -> Result<Option<Venue>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = ?1");
            let row = conn
                .query_row(&sql, [id], VenueRow::from_row)
                .optional()?;
            Ok(row.map(VenueRow::into_model))
        })
    }

    pub fn insert_venue(&self, venue: &Venue) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO venues (id, name, address, city, country, lat, lng, open_now, hours, happy_hours)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    venue.id.to_string(),
                    venue.name,
                    venue.address,
                    venue.city,
                    venue.country,
                    venue.lat,
                    venue.lng,
                    venue.open_now,
                    venue.hours.as_ref().map(|h| h.to_json()),
                    venue.happy_hours.as_ref().map(|h| h.to_json()),
                ],
            )?;
            Ok(())
        })
    }

    pub fn count_venues(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM venues", [], |r| r.get(0))?))
    }

    // -- Observations --

    pub fn latest_observation(&self, venue_id: &str) -> Result<Option<Observation>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {OBSERVATION_COLUMNS}
                 FROM prices p
                 LEFT JOIN beers b ON b.id = p.beer_id
                 WHERE p.venue_id = ?1
                 ORDER BY p.created_at DESC, p.rowid DESC
                 LIMIT 1"
            );
            let row = conn
                .query_row(&sql, [venue_id], ObservationRow::from_row)
                .optional()?;
            Ok(row.map(ObservationRow::into_model))
        })
    }

    /// Batch-fetch observations for a set of venues, newest first.
    pub fn observations_for_venues(&self, venue_ids: &[String]) -> Result<Vec<Observation>> {
        if venue_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=venue_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT {OBSERVATION_COLUMNS}
                 FROM prices p
                 LEFT JOIN beers b ON b.id = p.beer_id
                 WHERE p.venue_id IN ({})
                 ORDER BY p.created_at DESC, p.rowid DESC",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = venue_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), ObservationRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows.into_iter().map(ObservationRow::into_model).collect())
        })
    }

    /// Observations matching `filter`, oldest first.
    pub fn list_observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>> {
        let since = filter.since.as_ref().map(format_timestamp);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {OBSERVATION_COLUMNS}
                 FROM prices p
                 LEFT JOIN beers b ON b.id = p.beer_id
                 WHERE (?1 IS NULL OR p.user_id = ?1)
                   AND (?2 IS NULL OR p.created_at >= ?2)
                 ORDER BY p.created_at ASC, p.rowid ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![filter.user_id, since], ObservationRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(ObservationRow::into_model).collect())
        })
    }

    /// Append an observation, creating its venue and beer if they do not
    /// exist yet. Venues match on exact name (and city, when given); beers
    /// on exact name.
    pub fn insert_observation(&self, new: &NewObservation) -> Result<Observation> {
        let id = Uuid::new_v4().to_string();
        let created_at = format_timestamp(&Utc::now());

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let venue_id = match find_venue_id(&tx, &new.venue_name, new.city.as_deref())? {
                Some(existing) => existing,
                None => {
                    let venue_id = Uuid::new_v4().to_string();
                    tx.execute(
                        "INSERT INTO venues (id, name, city, lat, lng) VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            venue_id,
                            new.venue_name,
                            new.city.as_deref().unwrap_or_default(),
                            new.fallback_position.lat,
                            new.fallback_position.lng,
                        ],
                    )?;
                    info!("Created venue '{}' ({})", new.venue_name, venue_id);
                    venue_id
                }
            };

            let beer_id = match find_beer_id(&tx, &new.beer_name)? {
                Some(existing) => existing,
                None => {
                    let beer_id = Uuid::new_v4().to_string();
                    tx.execute(
                        "INSERT INTO beers (id, name, style) VALUES (?1, ?2, ?3)",
                        params![beer_id, new.beer_name, new.beer_style],
                    )?;
                    info!("Created beer '{}' ({})", new.beer_name, beer_id);
                    beer_id
                }
            };

            tx.execute(
                "INSERT INTO prices (id, venue_id, beer_id, price, currency, rating, user_id, photo_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    venue_id,
                    beer_id,
                    new.price,
                    new.currency,
                    new.rating,
                    new.user_id,
                    new.photo_url,
                    created_at,
                ],
            )?;

            let sql = format!(
                "SELECT {OBSERVATION_COLUMNS}
                 FROM prices p
                 LEFT JOIN beers b ON b.id = p.beer_id
                 WHERE p.id = ?1"
            );
            let row = tx.query_row(&sql, [&id], ObservationRow::from_row)?;

            tx.commit()?;
            Ok(row.into_model())
        })
    }
}

fn query_venues(conn: &Connection, city: Option<&str>, limit: u32) -> Result<Vec<Venue>> {
    let sql = format!(
        "SELECT {VENUE_COLUMNS} FROM venues
         WHERE (?1 IS NULL OR city = ?1)
         ORDER BY rowid
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![city, limit], VenueRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(VenueRow::into_model).collect())
}

fn find_venue_id(conn: &Connection, name: &str, city: Option<&str>) -> Result<Option<String>> {
    let city = city.filter(|c| !c.is_empty());
    conn.query_row(
        "SELECT id FROM venues WHERE name = ?1 AND (?2 IS NULL OR city = ?2) ORDER BY rowid LIMIT 1",
        params![name, city],
        |row| row.get(0),
    )
    .optional()
}

fn find_beer_id(conn: &Connection, name: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT id FROM beers WHERE name = ?1 ORDER BY rowid LIMIT 1",
        [name],
        |row| row.get(0),
    )
    .optional()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Weekday};
    use olradar_types::{GeoPoint, TimeRange, WeeklySchedule};

    fn submission(venue: &str, beer: &str, price: f64) -> NewObservation {
        NewObservation {
            venue_name: venue.to_string(),
            beer_name: beer.to_string(),
            beer_style: Some("Lager".to_string()),
            price,
            currency: "SEK".to_string(),
            rating: Some(4.0),
            city: Some("Stockholm".to_string()),
            user_id: Some("ada".to_string()),
            photo_url: None,
            fallback_position: GeoPoint::new(59.33, 18.06),
        }
    }

    #[test]
    fn submit_creates_venue_and_beer_once() {
        let db = Database::open_in_memory().unwrap();

        let first = db.insert_observation(&submission("Kvarnen", "Pilsner Urquell", 69.0)).unwrap();
        let second = db.insert_observation(&submission("Kvarnen", "Pilsner Urquell", 65.0)).unwrap();

        assert_eq!(first.venue_id, second.venue_id);
        assert_eq!(first.beer_id, second.beer_id);
        assert_eq!(db.count_venues().unwrap(), 1);

        let beer = second.beer.unwrap();
        assert_eq!(beer.name, "Pilsner Urquell");
        assert_eq!(beer.style.as_deref(), Some("Lager"));
        assert_eq!(second.user_id.as_deref(), Some("ada"));
        assert!(!second.verified);
    }

    #[test]
    fn venue_resolution_is_scoped_by_city() {
        let db = Database::open_in_memory().unwrap();
        let mut malmo = submission("Systemet Bar", "Lager", 55.0);
        malmo.city = Some("Malmö".to_string());

        let a = db.insert_observation(&submission("Systemet Bar", "Lager", 55.0)).unwrap();
        let b = db.insert_observation(&malmo).unwrap();
        assert_ne!(a.venue_id, b.venue_id);

        let venue = db.venue_by_id(&b.venue_id.to_string()).unwrap().unwrap();
        assert_eq!(venue.city, "Malmö");
        assert_eq!(venue.lat, 59.33);
        assert!(venue.hours.is_none());
    }

    #[test]
    fn latest_observation_per_venue() {
        let db = Database::open_in_memory().unwrap();
        db.insert_observation(&submission("Kvarnen", "Lager", 70.0)).unwrap();
        let newest = db.insert_observation(&submission("Kvarnen", "IPA", 75.0)).unwrap();

        let latest = db.latest_observation(&newest.venue_id.to_string()).unwrap().unwrap();
        assert_eq!(latest.id, newest.id);
        assert!(db.latest_observation(&Uuid::new_v4().to_string()).unwrap().is_none());
    }

    #[test]
    fn bulk_fetch_covers_requested_venues_only() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_observation(&submission("A", "Lager", 50.0)).unwrap();
        db.insert_observation(&submission("B", "Lager", 50.0)).unwrap();
        db.insert_observation(&submission("A", "Lager", 45.0)).unwrap();

        let rows = db.observations_for_venues(&[a.venue_id.to_string()]).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|o| o.venue_id == a.venue_id));
        assert_eq!(rows[0].price, 45.0);
        assert!(db.observations_for_venues(&[]).unwrap().is_empty());
    }

    #[test]
    fn filters_observations_by_user_and_time() {
        let db = Database::open_in_memory().unwrap();
        db.insert_observation(&submission("A", "Lager", 50.0)).unwrap();
        let mut anon = submission("A", "Lager", 52.0);
        anon.user_id = None;
        db.insert_observation(&anon).unwrap();

        let all = db.list_observations(&ObservationFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let mine = db
            .list_observations(&ObservationFilter {
                user_id: Some("ada".to_string()),
                since: None,
            })
            .unwrap();
        assert_eq!(mine.len(), 1);

        let future = db
            .list_observations(&ObservationFilter {
                user_id: None,
                since: Some(Utc::now() + Duration::hours(1)),
            })
            .unwrap();
        assert!(future.is_empty());
    }

    #[test]
    fn venues_round_trip_with_schedules() {
        let db = Database::open_in_memory().unwrap();
        let venue = Venue {
            id: Uuid::new_v4(),
            name: "Oliver Twist".to_string(),
            address: "Repslagargatan 6".to_string(),
            city: "Stockholm".to_string(),
            country: "SE".to_string(),
            lat: 59.3172,
            lng: 18.0716,
            open_now: Some(true),
            hours: Some(WeeklySchedule::new().with_day(Weekday::Mon, vec![TimeRange::new("16:00", "01:00")])),
            happy_hours: None,
        };
        db.insert_venue(&venue).unwrap();

        assert_eq!(db.list_venues(Some("Stockholm"), 100).unwrap(), vec![venue.clone()]);
        assert!(db.list_venues(Some("Malmö"), 100).unwrap().is_empty());
        assert_eq!(db.list_venues(None, 100).unwrap().len(), 1);
    }

    #[test]
    fn unreadable_hours_load_as_absent() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4().to_string();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO venues (id, name, lat, lng, hours) VALUES (?1, 'Broken', 59.0, 18.0, 'open late')",
                [&id],
            )?;
            Ok(())
        })
        .unwrap();

        let venue = db.venue_by_id(&id).unwrap().unwrap();
        assert!(venue.hours.is_none());
    }

    #[test]
    fn rejects_non_positive_price() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_observation(&submission("A", "Lager", 0.0)).is_err());
        assert_eq!(db.count_venues().unwrap(), 0);
    }
}
