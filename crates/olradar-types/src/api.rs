use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Observation, Venue};

// -- Venues --

#[derive(Debug, Deserialize)]
pub struct VenueQuery {
    pub city: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VenuesResponse {
    pub venues: Vec<Venue>,
}

// -- Nearby deals --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortMode {
    /// Keep the order the store returned.
    #[default]
    Standard,
    Cheapest,
    Nearest,
}

impl From<&str> for SortMode {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cheapest" | "cheap" => Self::Cheapest,
            "nearest" | "nearby" => Self::Nearest,
            _ => Self::Standard,
        }
    }
}

impl From<String> for SortMode {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub city: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub sort: SortMode,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A venue with its most recent deal, as shown in the deal list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub venue: Venue,
    pub deal: Option<Observation>,
    pub distance_km: Option<f64>,
    /// `None` when the venue's hours do not say anything about today.
    pub open_now: Option<bool>,
    pub happy_hour: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub items: Vec<RankedItem>,
}

// -- Gamification --

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Bronze,
    Silver,
    Gold,
}

impl Badge {
    /// Tier name: `entry`, `mid` or `top`.
    pub fn tier(self) -> &'static str {
        match self {
            Self::Bronze => "entry",
            Self::Silver => "mid",
            Self::Gold => "top",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze Hunter",
            Self::Silver => "Silver Hunter",
            Self::Gold => "Gold Hunter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStat {
    pub user_id: String,
    pub count: u32,
    pub xp: u32,
    pub badge: Option<Badge>,
    /// `entry`, `mid` or `top`, alongside `badge`.
    pub badge_tier: Option<String>,
    /// Display title, e.g. "Gold Hunter".
    pub badge_title: Option<String>,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub count: u32,
    pub xp: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub week_start: DateTime<Utc>,
    pub entries: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_mode_accepts_client_aliases() {
        assert_eq!(SortMode::from("cheap"), SortMode::Cheapest);
        assert_eq!(SortMode::from("Nearby"), SortMode::Nearest);
        assert_eq!(SortMode::from("nearest"), SortMode::Nearest);
        assert_eq!(SortMode::from("whatever"), SortMode::Standard);
    }

    #[test]
    fn sort_mode_deserializes_leniently() {
        let mode: SortMode = serde_json::from_str("\"cheap\"").unwrap();
        assert_eq!(mode, SortMode::Cheapest);
        assert_eq!(serde_json::to_string(&SortMode::Nearest).unwrap(), "\"nearest\"");
    }
}
