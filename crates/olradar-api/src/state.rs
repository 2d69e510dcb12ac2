use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Utc};

use olradar_db::DealStore;

use crate::photos::PhotoStorage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn DealStore>,
    pub photos: PhotoStorage,
    pub clock: Clock,
    /// Base URL photo links are built from, without a trailing slash.
    pub public_url: String,
    /// Trailing window for per-user stats.
    pub stats_window_days: i64,
}

/// Source of "now", read in the service's time zone.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: FixedOffset,
    pinned: Option<DateTime<Utc>>,
}

impl Clock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset, pinned: None }
    }

    /// Uses the host's current UTC offset.
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }

    /// Always reports `at`.
    pub fn pinned(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            offset,
            pinned: Some(at),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.pinned.unwrap_or_else(Utc::now).with_timezone(&self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn pinned_clock_reads_in_its_offset() {
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 22, 30, 0).unwrap();
        let clock = Clock::pinned(at, FixedOffset::east_opt(2 * 3600).unwrap());
        let now = clock.now();
        assert_eq!(now.hour(), 0);
        assert_eq!(now.with_timezone(&Utc), at);
    }
}
