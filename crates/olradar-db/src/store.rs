use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use olradar_types::{NewObservation, Observation, Venue};

use crate::Database;

#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub user_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

/// Everything the service needs from persistent storage.
///
/// Handlers only ever see this trait, so tests can swap in any store.
/// Calls are blocking; run them off the async runtime.
pub trait DealStore: Send + Sync {
    fn fetch_venues(&self, city: Option<&str>, limit: u32) -> Result<Vec<Venue>>;

    fn get_venue(&self, id: Uuid) -> Result<Option<Venue>>;

    /// Latest observation for a venue, with its beer joined in.
    fn fetch_latest_observation(&self, venue_id: Uuid) -> Result<Option<Observation>>;

    /// All observations for the given venues in one round-trip.
    fn fetch_observations_for_venues(&self, venue_ids: &[Uuid]) -> Result<Vec<Observation>>;

    fn fetch_observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>>;

    fn submit_observation(&self, new: &NewObservation) -> Result<Observation>;
}

impl DealStore for Database {
    fn fetch_venues(&self, city: Option<&str>, limit: u32) -> Result<Vec<Venue>> {
        self.list_venues(city, limit)
    }

    fn get_venue(&self, id: Uuid) -> Result<Option<Venue>> {
        self.venue_by_id(&id.to_string())
    }

    fn fetch_latest_observation(&self, venue_id: Uuid) -> Result<Option<Observation>> {
        self.latest_observation(&venue_id.to_string())
    }

    fn fetch_observations_for_venues(&self, venue_ids: &[Uuid]) -> Result<Vec<Observation>> {
        let ids: Vec<String> = venue_ids.iter().map(Uuid::to_string).collect();
        self.observations_for_venues(&ids)
    }

    fn fetch_observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>> {
        self.list_observations(filter)
    }

    fn submit_observation(&self, new: &NewObservation) -> Result<Observation> {
        self.insert_observation(new)
    }
}
