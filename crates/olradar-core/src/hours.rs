//! Open-now and happy-hour evaluation.
//!
//! Bad hours data never produces an error here: a table we cannot read
//! is treated as saying nothing, so the caller shows nothing instead of
//! a wrong "closed".

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use tracing::debug;

use olradar_types::{TimeRange, WeeklySchedule};

/// Prices at or below this are flagged as happy hour regardless of time.
pub const HAPPY_HOUR_PRICE_THRESHOLD: f64 = 39.0;

/// Scheduled discounts only count as happy hour if they end by 19:00.
pub const HAPPY_HOUR_LATEST_END: u32 = 19 * 60;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse `HH:MM` (or a bare `HH`) into minutes after midnight.
/// `24:00` is accepted as the end of the day.
pub fn parse_hhmm(raw: &str) -> Option<u32> {
    let mut parts = raw.trim().splitn(2, ':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = match parts.next() {
        Some(m) => m.trim().parse().ok()?,
        None => 0,
    };
    if minutes > 59 {
        return None;
    }
    let total = hours * 60 + minutes;
    (total <= MINUTES_PER_DAY).then_some(total)
}

fn parse_range(range: &TimeRange) -> Option<(u32, u32)> {
    let start = parse_hhmm(&range.start)?;
    let end = parse_hhmm(&range.end)?;
    (start <= end).then_some((start, end))
}

fn minute_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> u32 {
    now.hour() * 60 + now.minute()
}

/// Parse all of today's ranges, or `None` if any of them is malformed.
fn todays_ranges<Tz: TimeZone>(
    schedule: &WeeklySchedule,
    now: &DateTime<Tz>,
) -> Option<Option<Vec<(u32, u32)>>> {
    let Some(ranges) = schedule.ranges_for(now.weekday()) else {
        return Some(None);
    };
    let mut parsed = Vec::with_capacity(ranges.len());
    for range in ranges {
        match parse_range(range) {
            Some(r) => parsed.push(r),
            None => {
                debug!("Ignoring malformed time range {}-{}", range.start, range.end);
                return None;
            }
        }
    }
    Some(Some(parsed))
}

/// Whether the venue is open at `now`.
///
/// `None` means the table does not tell: no table, no entry for today,
/// or an unreadable entry for today.
pub fn open_now<Tz: TimeZone>(hours: Option<&WeeklySchedule>, now: &DateTime<Tz>) -> Option<bool> {
    let ranges = todays_ranges(hours?, now)??;
    let minute = minute_of_day(now);
    Some(ranges.iter().any(|&(start, end)| start <= minute && minute <= end))
}

pub fn is_happy_price(price: f64) -> bool {
    price <= HAPPY_HOUR_PRICE_THRESHOLD
}

/// Whether an explicit happy-hour range covers `now`. Only ranges that end
/// by [`HAPPY_HOUR_LATEST_END`] count.
pub fn scheduled_happy_hour<Tz: TimeZone>(
    schedule: Option<&WeeklySchedule>,
    now: &DateTime<Tz>,
) -> bool {
    let Some(Some(ranges)) = schedule.and_then(|s| todays_ranges(s, now)) else {
        return false;
    };
    let minute = minute_of_day(now);
    ranges
        .iter()
        .any(|&(start, end)| end <= HAPPY_HOUR_LATEST_END && start <= minute && minute <= end)
}

/// Happy hour if the cheapest relevant price is low enough or the schedule
/// says so.
pub fn happy_hour_now<Tz: TimeZone>(
    schedule: Option<&WeeklySchedule>,
    lowest_price: Option<f64>,
    now: &DateTime<Tz>,
) -> bool {
    lowest_price.is_some_and(is_happy_price) || scheduled_happy_hour(schedule, now)
}
