//! Daily water-intake model.
//!
//! # Invariants
//! - One record per calendar day (`day` is unique in storage).
//! - `glasses_drunk` never underflows; removing a glass at zero is a no-op.
//! - The reminder interval is compared in minutes; hours are converted first.
//! - A new day inherits target, interval and last drink from the latest
//!   earlier day; [`WaterDefaults`] apply only to the very first record.

use super::{RecordMeta, ValidationError};
use crate::config::CoreConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Minutes,
    Hours,
}

impl IntervalUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "minutes" => Some(Self::Minutes),
            "hours" => Some(Self::Hours),
            _ => None,
        }
    }
}

/// User-configured "remind me every N minutes/hours" setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderInterval {
    pub value: u32,
    pub unit: IntervalUnit,
}

impl ReminderInterval {
    pub fn minutes(value: u32) -> Self {
        Self {
            value,
            unit: IntervalUnit::Minutes,
        }
    }

    pub fn hours(value: u32) -> Self {
        Self {
            value,
            unit: IntervalUnit::Hours,
        }
    }

    /// Interval normalized to minutes.
    pub fn as_minutes(&self) -> u64 {
        match self.unit {
            IntervalUnit::Minutes => u64::from(self.value),
            IntervalUnit::Hours => u64::from(self.value) * 60,
        }
    }

    pub fn as_millis(&self) -> i64 {
        self.as_minutes() as i64 * crate::clock::MINUTE_MS
    }
}

/// Settings for the first day record of a fresh store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterDefaults {
    pub target_glasses: u32,
    pub interval: ReminderInterval,
}

impl WaterDefaults {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            target_glasses: config.water_default_target,
            interval: ReminderInterval::minutes(config.water_default_interval_minutes),
        }
    }
}

impl Default for WaterDefaults {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterIntake {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub day: NaiveDate,
    pub target_glasses: u32,
    pub glasses_drunk: u32,
    pub interval: ReminderInterval,
    pub last_drink_at: Option<i64>,
    pub last_reminded_at: Option<i64>,
}

impl WaterIntake {
    pub fn new(day: NaiveDate, target_glasses: u32, interval: ReminderInterval) -> Self {
        Self {
            meta: RecordMeta::new(),
            day,
            target_glasses,
            glasses_drunk: 0,
            interval,
            last_drink_at: None,
            last_reminded_at: None,
        }
    }

    /// Empty record for `day` that keeps the settings of `previous`.
    ///
    /// The last drink and last reminder carry over only from an earlier day,
    /// so the interval keeps running across midnight.
    pub fn carried_over(previous: &WaterIntake, day: NaiveDate) -> Self {
        let mut record = Self::new(day, previous.target_glasses, previous.interval);
        if previous.day < day {
            record.last_drink_at = previous.last_drink_at;
            record.last_reminded_at = previous.last_reminded_at;
        }
        record
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.target_glasses == 0 {
            return Err(ValidationError::NonPositiveValue {
                field: "target_glasses",
                value: 0.0,
            });
        }
        if self.interval.value == 0 {
            return Err(ValidationError::NonPositiveValue {
                field: "interval",
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn add_glass(&mut self, now_ms: i64) {
        self.glasses_drunk = self.glasses_drunk.saturating_add(1);
        self.last_drink_at = Some(now_ms);
    }

    pub fn remove_glass(&mut self) {
        self.glasses_drunk = self.glasses_drunk.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.glasses_drunk = 0;
        self.last_drink_at = None;
        self.last_reminded_at = None;
    }

    pub fn target_reached(&self) -> bool {
        self.glasses_drunk >= self.target_glasses
    }
}

#[cfg(test)]
mod tests {
    use super::{ReminderInterval, WaterIntake};
    use chrono::NaiveDate;

    #[test]
    fn hours_are_normalized_to_minutes() {
        assert_eq!(ReminderInterval::hours(2).as_minutes(), 120);
        assert_eq!(ReminderInterval::minutes(45).as_minutes(), 45);
        assert_eq!(ReminderInterval::hours(1).as_millis(), 3_600_000);
    }

    #[test]
    fn next_day_keeps_settings_and_last_drink() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        let mut previous = WaterIntake::new(day, 12, ReminderInterval::hours(3));
        previous.add_glass(500);
        previous.last_reminded_at = Some(700);

        let next_day = day.succ_opt().expect("valid date");
        let record = WaterIntake::carried_over(&previous, next_day);
        assert_eq!(record.day, next_day);
        assert_eq!(record.target_glasses, 12);
        assert_eq!(record.interval, ReminderInterval::hours(3));
        assert_eq!(record.glasses_drunk, 0);
        assert_eq!(record.last_drink_at, Some(500));
        assert_eq!(record.last_reminded_at, Some(700));
        assert_ne!(record.meta.id, previous.meta.id);

        let same_day = WaterIntake::carried_over(&previous, day);
        assert_eq!(same_day.last_drink_at, None);
    }

    #[test]
    fn remove_glass_saturates_at_zero() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        let mut record = WaterIntake::new(day, 8, ReminderInterval::minutes(30));
        record.remove_glass();
        assert_eq!(record.glasses_drunk, 0);
        record.add_glass(10);
        assert_eq!(record.glasses_drunk, 1);
        assert_eq!(record.last_drink_at, Some(10));
    }
}
