use chrono::{FixedOffset, NaiveDate, TimeZone};
use hearth_core::calendar::days_until;
use hearth_core::cipher::{decrypt, encrypt};
use hearth_core::clock::HOUR_MS;
use hearth_core::model::water::{ReminderInterval, WaterIntake};
use hearth_core::progress::{estimated_days_to_target, progress_percent};
use hearth_core::reminder::evaluator::transactions_stale;

#[test]
fn estimated_days_is_integer_ceiling() {
    for remaining in 1..=60_u32 {
        for daily in 1..=12_u32 {
            let expected = u64::from(remaining.div_ceil(daily));
            assert_eq!(
                estimated_days_to_target(f64::from(remaining), f64::from(daily)),
                expected,
                "remaining={remaining} daily={daily}"
            );
        }
    }
    assert_eq!(estimated_days_to_target(0.0, 5.0), 0);
    assert_eq!(estimated_days_to_target(-3.0, 5.0), 0);
    assert_eq!(estimated_days_to_target(10.0, 0.0), 0);
}

#[test]
fn percent_stays_within_bounds() {
    for current in [-5.0, 0.0, 1.0, 49.5, 100.0, 250.0, f64::INFINITY] {
        for target in [-1.0, 0.0, 1.0, 100.0] {
            let percent = progress_percent(current, target);
            assert!((0.0..=100.0).contains(&percent), "{current}/{target}");
        }
    }
    assert_eq!(progress_percent(300.0, 200.0), 100.0);
}

#[test]
fn cipher_roundtrips_for_any_key() {
    let text = "Pay rent on the 1st! Ünïcode & digits 123 stay.";
    for key in [-53, -26, -1, 0, 1, 3, 25, 26, 27, 1000] {
        let encrypted = encrypt(text, key);
        assert_eq!(decrypt(&encrypted, key), text, "key={key}");
        let kept = encrypted
            .chars()
            .zip(text.chars())
            .filter(|(_, original)| !original.is_ascii_alphabetic())
            .all(|(shifted, original)| shifted == original);
        assert!(kept, "non-letters changed for key={key}");
    }
    assert_eq!(encrypt("abc XYZ", 3), "def ABC");
}

#[test]
fn days_until_due_ignores_time_of_day() {
    let tz = FixedOffset::east_opt(7 * 3600).unwrap();
    let late_evening = tz
        .with_ymd_and_hms(2024, 3, 10, 23, 30, 0)
        .single()
        .unwrap()
        .timestamp_millis();
    for hour in [0, 1, 8, 12, 23] {
        let due = tz
            .with_ymd_and_hms(2024, 3, 11, hour, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(days_until(late_evening, due, &tz), 1, "hour={hour}");
    }
    let early_morning = late_evening - 23 * HOUR_MS;
    assert_eq!(days_until(early_morning, late_evening, &tz), 0);
}

#[test]
fn eight_glass_target_half_way_then_reset() {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut record = WaterIntake::new(day, 8, ReminderInterval::minutes(60));
    for minute in 0..4 {
        record.add_glass(minute * 60_000);
    }
    let percent = |r: &WaterIntake| {
        progress_percent(f64::from(r.glasses_drunk), f64::from(r.target_glasses))
    };
    assert_eq!(percent(&record), 50.0);
    record.reset();
    assert_eq!(percent(&record), 0.0);
}

#[test]
fn transaction_gap_of_25_hours_is_stale() {
    let now = 1_717_200_000_000;
    assert!(transactions_stale(&[now - 25 * HOUR_MS], now));
    assert!(!transactions_stale(&[now - 25 * HOUR_MS, now - 23 * HOUR_MS], now));
    assert!(!transactions_stale(&[now], now));
    assert!(transactions_stale(&[], now));
}
