pub mod api;
pub mod models;
pub mod schedule;

pub use models::{Beer, GeoPoint, NewObservation, Observation, Venue};
pub use schedule::{TimeRange, WeeklySchedule};
