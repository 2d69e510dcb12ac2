use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};

use olradar_types::Observation;
use olradar_types::api::{Badge, UserStat};

pub const XP_PER_LOG: u32 = 10;
pub const XP_BONUS_PER_TEN: u32 = 25;

pub fn xp_for_logs(count: u32) -> u32 {
    count * XP_PER_LOG + (count / 10) * XP_BONUS_PER_TEN
}

/// Highest badge unlocked by `count` logs.
pub fn badge_for_count(count: u32) -> Option<Badge> {
    match count {
        100.. => Some(Badge::Gold),
        50.. => Some(Badge::Silver),
        20.. => Some(Badge::Bronze),
        _ => None,
    }
}

/// Number of consecutive calendar days, ending today, with at least one log.
///
/// Days are calendar dates in `now`'s time zone.
pub fn streak_from_dates<Tz: TimeZone>(dates: &[DateTime<Utc>], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: HashSet<_> = dates
        .iter()
        .map(|d| d.with_timezone(&tz).date_naive())
        .collect();

    let mut streak = 0;
    let mut cursor = Some(now.date_naive());
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

pub fn user_stat<Tz: TimeZone>(user_id: &str, dates: &[DateTime<Utc>], now: &DateTime<Tz>) -> UserStat {
    let count = u32::try_from(dates.len()).unwrap_or(u32::MAX);
    let badge = badge_for_count(count);
    UserStat {
        user_id: user_id.to_string(),
        count,
        xp: xp_for_logs(count),
        badge,
        badge_tier: badge.map(|b| b.tier().to_string()),
        badge_title: badge.map(|b| b.title().to_string()),
        streak: streak_from_dates(dates, now),
    }
}

/// Timestamps per contributor, contributors in order of first appearance.
/// Anonymous observations are skipped.
pub fn group_by_contributor(observations: &[Observation]) -> Vec<(String, Vec<DateTime<Utc>>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<DateTime<Utc>>)> = Vec::new();

    for obs in observations {
        let Some(user) = obs.user_id.as_deref() else {
            continue;
        };
        let slot = *index.entry(user).or_insert_with(|| {
            groups.push((user.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(obs.created_at);
    }
    groups
}

pub fn user_stats<Tz: TimeZone>(observations: &[Observation], now: &DateTime<Tz>) -> Vec<UserStat> {
    group_by_contributor(observations)
        .iter()
        .map(|(user, dates)| user_stat(user, dates, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use uuid::Uuid;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 4, 12, 0, 0)
            .unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        (now() - Duration::days(days)).with_timezone(&Utc)
    }

    fn obs(user: Option<&str>, created_at: DateTime<Utc>) -> Observation {
        Observation {
            id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            beer_id: Uuid::new_v4(),
            beer: None,
            price: 59.0,
            currency: "SEK".into(),
            rating: None,
            photo_url: None,
            user_id: user.map(str::to_string),
            verified: false,
            created_at,
        }
    }

    #[test]
    fn xp_formula() {
        assert_eq!(xp_for_logs(0), 0);
        assert_eq!(xp_for_logs(1), 10);
        assert_eq!(xp_for_logs(10), 125);
        assert_eq!(xp_for_logs(99), 1215);
        assert_eq!(xp_for_logs(100), 1250);
    }

    #[test]
    fn badge_thresholds() {
        assert_eq!(badge_for_count(0), None);
        assert_eq!(badge_for_count(19), None);
        assert_eq!(badge_for_count(20).map(Badge::tier), Some("entry"));
        assert_eq!(badge_for_count(49), Some(Badge::Bronze));
        assert_eq!(badge_for_count(50).map(Badge::tier), Some("mid"));
        assert_eq!(badge_for_count(100).map(Badge::tier), Some("top"));
        assert_eq!(badge_for_count(5000), Some(Badge::Gold));
    }

    #[test]
    fn streak_counts_back_from_today() {
        assert_eq!(streak_from_dates(&[], &now()), 0);
        assert_eq!(streak_from_dates(&[days_ago(0)], &now()), 1);
        assert_eq!(streak_from_dates(&[days_ago(0), days_ago(1)], &now()), 2);
        assert_eq!(streak_from_dates(&[days_ago(0), days_ago(1), days_ago(3)], &now()), 2);
    }

    #[test]
    fn streak_needs_today() {
        assert_eq!(streak_from_dates(&[days_ago(1), days_ago(2)], &now()), 0);
    }

    #[test]
    fn same_day_counts_once() {
        let morning = days_ago(0) - Duration::hours(3);
        assert_eq!(streak_from_dates(&[days_ago(0), morning, days_ago(1)], &now()), 2);
    }

    #[test]
    fn days_follow_local_calendar() {
        // 00:30 local on the 4th is still the 3rd in UTC.
        let just_after_midnight = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 4, 0, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(streak_from_dates(&[just_after_midnight], &now()), 1);
    }

    #[test]
    fn user_stat_carries_badge_tier_and_title() {
        let dates: Vec<_> = (0..20).map(|_| days_ago(0)).collect();
        let stat = user_stat("ada", &dates, &now());
        assert_eq!(stat.badge, Some(Badge::Bronze));
        assert_eq!(stat.badge_tier.as_deref(), Some("entry"));
        assert_eq!(stat.badge_title.as_deref(), Some("Bronze Hunter"));
        assert_eq!(stat.streak, 1);

        let fresh = user_stat("bo", &dates[..3], &now());
        assert_eq!(fresh.badge_tier, None);
        assert_eq!(fresh.badge_title, None);
    }

    #[test]
    fn stats_group_by_contributor() {
        let observations = vec![
            obs(Some("ada"), days_ago(0)),
            obs(None, days_ago(0)),
            obs(Some("bo"), days_ago(2)),
            obs(Some("ada"), days_ago(1)),
        ];
        let stats = user_stats(&observations, &now());

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].user_id, "ada");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].xp, 20);
        assert_eq!(stats[0].streak, 2);
        assert_eq!(stats[1].user_id, "bo");
        assert_eq!(stats[1].streak, 0);
    }
}
