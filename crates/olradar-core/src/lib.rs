//! Deal ranking and gamification pipeline.
//!
//! Everything in this crate is a pure function over data that has already
//! been fetched. Time-dependent functions take "now" as an argument, in
//! whatever time zone calendar days and opening hours should be read in.

pub mod cities;
pub mod game;
pub mod geo;
pub mod hours;
pub mod leaderboard;
pub mod ranking;

pub use game::{badge_for_count, streak_from_dates, user_stat, xp_for_logs};
pub use geo::distance_km;
pub use hours::{happy_hour_now, open_now};
pub use leaderboard::{week_start, weekly_leaderboard};
pub use ranking::{latest_per_venue, rank};
