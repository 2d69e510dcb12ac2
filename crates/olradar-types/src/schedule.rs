//! Weekly time tables as they are stored upstream.
//!
//! Tables are JSON objects keyed by weekday. Keys are either the JS-style
//! day index (`"0"` is Sunday) or an English day name, full or abbreviated.
//! Values are lists of `{ "start": "HH:MM", "end": "HH:MM" }`. Times are
//! kept as strings here; interpretation happens in the evaluator.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule(pub BTreeMap<String, Vec<TimeRange>>);

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used mostly by seed data and tests.
    pub fn with_day(mut self, day: Weekday, ranges: Vec<TimeRange>) -> Self {
        self.0.insert(day_key(day).to_string(), ranges);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ranges listed for `day`, or `None` when the table has no entry for it.
    /// If several keys name the same day, the first one in key order wins.
    pub fn ranges_for(&self, day: Weekday) -> Option<&[TimeRange]> {
        self.0
            .iter()
            .find(|(key, _)| parse_weekday_key(key) == Some(day))
            .map(|(_, ranges)| ranges.as_slice())
    }

    /// Parse a stored table. Days whose value is not a list of ranges are
    /// dropped; if nothing usable is left, or `raw` is not a JSON object,
    /// the result is `None` rather than an error.
    pub fn from_json_lenient(raw: &str) -> Option<Self> {
        let days: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw).ok()?;
        let schedule = Self(
            days.into_iter()
                .filter_map(|(key, value)| {
                    serde_json::from_value::<Vec<TimeRange>>(value).ok().map(|ranges| (key, ranges))
                })
                .collect(),
        );
        if schedule.is_empty() {
            None
        } else {
            Some(schedule)
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Canonical key written for `day`: the JS-style index.
pub fn day_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "0",
        Weekday::Mon => "1",
        Weekday::Tue => "2",
        Weekday::Wed => "3",
        Weekday::Thu => "4",
        Weekday::Fri => "5",
        Weekday::Sat => "6",
    }
}

pub fn parse_weekday_key(key: &str) -> Option<Weekday> {
    let key = key.trim().to_ascii_lowercase();
    let day = match key.as_str() {
        "0" | "sun" | "sunday" => Weekday::Sun,
        "1" | "mon" | "monday" => Weekday::Mon,
        "2" | "tue" | "tues" | "tuesday" => Weekday::Tue,
        "3" | "wed" | "wednesday" => Weekday::Wed,
        "4" | "thu" | "thurs" | "thursday" => Weekday::Thu,
        "5" | "fri" | "friday" => Weekday::Fri,
        "6" | "sat" | "saturday" => Weekday::Sat,
        _ => return None,
    };
    Some(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_and_named_keys() {
        let raw = r#"{"1":[{"start":"16:00","end":"18:00"}],"Sat":[],"holiday":[]}"#;
        let schedule = WeeklySchedule::from_json_lenient(raw).unwrap();

        assert_eq!(schedule.ranges_for(Weekday::Mon).unwrap().len(), 1);
        assert_eq!(schedule.ranges_for(Weekday::Sat).unwrap().len(), 0);
        assert!(schedule.ranges_for(Weekday::Tue).is_none());
    }

    #[test]
    fn malformed_tables_are_absent() {
        assert!(WeeklySchedule::from_json_lenient("").is_none());
        assert!(WeeklySchedule::from_json_lenient("{}").is_none());
        assert!(WeeklySchedule::from_json_lenient("[1,2]").is_none());
        assert!(WeeklySchedule::from_json_lenient(r#"{"1":"16-18"}"#).is_none());
    }

    #[test]
    fn bad_day_does_not_drop_the_others() {
        let raw = r#"{"1":[{"start":"11:00","end":"23:00"}],"2":"closed","3":[{"start":"12:00"}]}"#;
        let schedule = WeeklySchedule::from_json_lenient(raw).unwrap();

        assert_eq!(schedule.ranges_for(Weekday::Mon), Some(&[TimeRange::new("11:00", "23:00")][..]));
        assert!(schedule.ranges_for(Weekday::Tue).is_none());
        assert!(schedule.ranges_for(Weekday::Wed).is_none());
    }

    #[test]
    fn only_js_day_indexes_are_numeric_keys() {
        assert_eq!(parse_weekday_key("0"), Some(Weekday::Sun));
        assert_eq!(parse_weekday_key("6"), Some(Weekday::Sat));
        assert_eq!(parse_weekday_key("7"), None);
        assert_eq!(parse_weekday_key(" Thursday "), Some(Weekday::Thu));
    }

    #[test]
    fn builder_round_trips_through_storage_form() {
        let schedule = WeeklySchedule::new()
            .with_day(Weekday::Fri, vec![TimeRange::new("15:00", "18:00")]);
        let restored = WeeklySchedule::from_json_lenient(&schedule.to_json()).unwrap();
        assert_eq!(restored, schedule);
    }
}
