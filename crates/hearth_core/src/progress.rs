//! Progress arithmetic shared by savings, water and task statistics.
//!
//! Divide-by-zero and non-finite inputs degrade to a zero result.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trailing window used by [`rolling_completion_rate`], today included.
pub const ROLLING_WINDOW_DAYS: i64 = 7;

/// Fraction of `target` reached, clamped to `[0, 1]`.
pub fn progress_fraction(current: f64, target: f64) -> f64 {
    if !current.is_finite() || !target.is_finite() || target <= 0.0 {
        return 0.0;
    }
    (current / target).clamp(0.0, 1.0)
}

/// Percentage of `target` reached, clamped to `[0, 100]`.
pub fn progress_percent(current: f64, target: f64) -> f64 {
    progress_fraction(current, target) * 100.0
}

/// Days of `daily` increments needed to cover `remaining` (ceiling).
///
/// Zero when nothing remains or no daily increment is planned.
pub fn estimated_days_to_target(remaining: f64, daily: f64) -> u64 {
    if !remaining.is_finite() || !daily.is_finite() || remaining <= 0.0 || daily <= 0.0 {
        return 0;
    }
    (remaining / daily).ceil() as u64
}

/// Achievement for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayProgress {
    pub day: NaiveDate,
    pub achieved: f64,
    pub target: f64,
}

/// Mean completion over the trailing window ending at `today`.
///
/// Days without an entry count as zero. When a day has several entries the
/// best one wins.
pub fn rolling_completion_rate(days: &[DayProgress], today: NaiveDate) -> f64 {
    let window_start = today - Duration::days(ROLLING_WINDOW_DAYS - 1);
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for entry in days {
        if entry.day < window_start || entry.day > today {
            continue;
        }
        let fraction = progress_fraction(entry.achieved, entry.target);
        per_day
            .entry(entry.day)
            .and_modify(|best| *best = best.max(fraction))
            .or_insert(fraction);
    }

    per_day.values().sum::<f64>() / ROLLING_WINDOW_DAYS as f64
}

#[cfg(test)]
mod tests {
    use super::{
        estimated_days_to_target, progress_percent, rolling_completion_rate, DayProgress,
    };
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).expect("valid date")
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(progress_percent(4.0, 8.0), 50.0);
        assert_eq!(progress_percent(0.0, 8.0), 0.0);
        assert_eq!(progress_percent(12.0, 8.0), 100.0);
        assert_eq!(progress_percent(-3.0, 8.0), 0.0);
        assert_eq!(progress_percent(5.0, 0.0), 0.0);
    }

    #[test]
    fn estimated_days_uses_ceiling() {
        assert_eq!(estimated_days_to_target(100.0, 30.0), 4);
        assert_eq!(estimated_days_to_target(90.0, 30.0), 3);
        assert_eq!(estimated_days_to_target(1.0, 30.0), 1);
        assert_eq!(estimated_days_to_target(0.0, 30.0), 0);
        assert_eq!(estimated_days_to_target(-5.0, 30.0), 0);
        assert_eq!(estimated_days_to_target(50.0, 0.0), 0);
    }

    #[test]
    fn estimated_days_matches_integer_ceiling() {
        for remaining in 1..200u64 {
            for daily in 1..25u64 {
                let expected = remaining.div_ceil(daily);
                assert_eq!(
                    estimated_days_to_target(remaining as f64, daily as f64),
                    expected,
                    "remaining={remaining} daily={daily}"
                );
            }
        }
    }

    #[test]
    fn rolling_rate_counts_missing_days_as_zero() {
        let entries = vec![
            DayProgress { day: day(10), achieved: 8.0, target: 8.0 },
            DayProgress { day: day(9), achieved: 4.0, target: 8.0 },
            // Outside the window.
            DayProgress { day: day(3), achieved: 8.0, target: 8.0 },
        ];
        let rate = rolling_completion_rate(&entries, day(10));
        assert!((rate - 1.5 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn rolling_rate_keeps_best_entry_per_day() {
        let entries = vec![
            DayProgress { day: day(10), achieved: 2.0, target: 8.0 },
            DayProgress { day: day(10), achieved: 10.0, target: 8.0 },
        ];
        let rate = rolling_completion_rate(&entries, day(10));
        assert!((rate - 1.0 / 7.0).abs() < 1e-9);
    }
}
