use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveTime, TimeZone, Utc};

use olradar_types::api::LeaderboardEntry;

use crate::game::xp_for_logs;

pub const LEADERBOARD_SIZE: usize = 5;

/// Monday 00:00 of the week containing `now`, in `now`'s time zone.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - Duration::days(days_since_monday);
    let midnight = monday.and_time(NaiveTime::MIN);

    match now.timezone().from_local_datetime(&midnight) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight skipped by a DST jump; fall back to reading it as UTC.
        LocalResult::None => midnight.and_utc(),
    }
}

/// Top contributors by number of logs since this week's Monday.
///
/// Contributors without logs this week are left out. Ties keep input order.
pub fn weekly_leaderboard<Tz: TimeZone>(
    logs_by_user: &[(String, Vec<DateTime<Utc>>)],
    now: &DateTime<Tz>,
) -> Vec<LeaderboardEntry> {
    let start = week_start(now);

    let mut entries: Vec<LeaderboardEntry> = logs_by_user
        .iter()
        .filter_map(|(user, dates)| {
            let count = dates.iter().filter(|d| **d >= start).count();
            let count = u32::try_from(count).unwrap_or(u32::MAX);
            (count > 0).then(|| LeaderboardEntry {
                user_id: user.clone(),
                count,
                xp: xp_for_logs(count),
            })
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}
