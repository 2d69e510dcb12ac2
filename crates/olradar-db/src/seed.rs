//! Demo venues for a fresh database.

use anyhow::Result;
use chrono::Weekday;
use tracing::info;
use uuid::Uuid;

use olradar_types::{TimeRange, Venue, WeeklySchedule};

use crate::Database;

const WEEKDAYS: [Weekday; 5] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];

fn pub_hours() -> WeeklySchedule {
    let mut hours = WeeklySchedule::new();
    for day in WEEKDAYS {
        hours = hours.with_day(day, vec![TimeRange::new("11:00", "23:59")]);
    }
    hours
        .with_day(Weekday::Sat, vec![TimeRange::new("12:00", "23:59")])
        .with_day(Weekday::Sun, vec![TimeRange::new("12:00", "22:00")])
}

fn after_work() -> WeeklySchedule {
    let mut schedule = WeeklySchedule::new();
    for day in WEEKDAYS {
        schedule = schedule.with_day(day, vec![TimeRange::new("16:00", "18:00")]);
    }
    schedule
}

fn demo_venue(name: &str, address: &str, city: &str, lat: f64, lng: f64, happy: bool) -> Venue {
    Venue {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        country: "SE".to_string(),
        lat,
        lng,
        open_now: None,
        hours: Some(pub_hours()),
        happy_hours: happy.then(after_work),
    }
}

/// Insert a handful of venues if the database has none. Returns how many
/// were added.
pub fn seed_if_empty(db: &Database) -> Result<usize> {
    if db.count_venues()? > 0 {
        return Ok(0);
    }

    let venues = [
        demo_venue("Kvarnen", "Tjärhovsgatan 4", "Stockholm", 59.3155, 18.0745, false),
        demo_venue("Oliver Twist", "Repslagargatan 6", "Stockholm", 59.3172, 18.0716, true),
        demo_venue("Akkurat", "Hornsgatan 18", "Stockholm", 59.3196, 18.0667, false),
        demo_venue("Ølstugan Tullen", "Gustav Adolfsgatan 1", "Malmö", 55.5985, 13.0007, true),
        demo_venue("Brewers Beer Bar", "Kungsgatan 18", "Göteborg", 57.7052, 11.9658, false),
        demo_venue("Bryggeriet", "Norra Storgatan 20", "Helsingborg", 56.0479, 12.6932, true),
    ];
    for venue in &venues {
        db.insert_venue(venue)?;
    }

    info!("Seeded {} demo venues", venues.len());
    Ok(venues.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_only_once() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(seed_if_empty(&db).unwrap(), 6);
        assert_eq!(seed_if_empty(&db).unwrap(), 0);
        assert_eq!(db.list_venues(Some("Stockholm"), 100).unwrap().len(), 3);
    }
}
