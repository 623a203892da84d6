//! Water intake use-case service.
//!
//! # Responsibility
//! - Keep exactly one intake record per local calendar day.
//! - Apply glass increments, resets and reminder settings to today's record.
//!
//! # Invariants
//! - Today's record is created lazily, inheriting the latest day's settings.
//! - `glasses_drunk` never goes below zero.

use crate::calendar::local_day;
use crate::clock::SharedClock;
use crate::model::water::{ReminderInterval, WaterIntake};
use crate::progress::{progress_percent, rolling_completion_rate, DayProgress, ROLLING_WINDOW_DAYS};
use crate::repo::record_repo::{RecordQuery, Repository};
use crate::repo::water_days::{find_water_day, open_water_day};
use crate::service::{load_into, settle, ServiceResult};
use crate::state::StateHolder;
use chrono::{FixedOffset, NaiveDate};
use std::sync::Arc;

pub use crate::model::water::WaterDefaults;

pub struct WaterService<R: Repository<WaterIntake>> {
    repo: R,
    clock: SharedClock,
    tz: FixedOffset,
    defaults: WaterDefaults,
    state: Arc<StateHolder<WaterIntake>>,
}

impl<R: Repository<WaterIntake>> WaterService<R> {
    pub fn new(repo: R, clock: SharedClock, tz: FixedOffset, defaults: WaterDefaults) -> Self {
        Self {
            repo,
            clock,
            tz,
            defaults,
            state: Arc::new(StateHolder::new()),
        }
    }

    pub fn state(&self) -> Arc<StateHolder<WaterIntake>> {
        Arc::clone(&self.state)
    }

    /// Today's record, created on first access.
    pub fn today(&self) -> ServiceResult<WaterIntake> {
        let record = self.today_or_create()?;
        self.state.publish_items(vec![record.clone()]);
        Ok(record)
    }

    pub fn add_glass(&self) -> ServiceResult<WaterIntake> {
        let now = self.clock.now_ms();
        self.mutate_today(|record| record.add_glass(now))
    }

    pub fn remove_glass(&self) -> ServiceResult<WaterIntake> {
        self.mutate_today(WaterIntake::remove_glass)
    }

    pub fn reset_today(&self) -> ServiceResult<WaterIntake> {
        self.mutate_today(WaterIntake::reset)
    }

    /// Changes the target and reminder interval from today on.
    pub fn update_settings(
        &self,
        target_glasses: u32,
        interval: ReminderInterval,
    ) -> ServiceResult<WaterIntake> {
        self.mutate_today(|record| {
            record.target_glasses = target_glasses;
            record.interval = interval;
        })
    }

    /// Today's progress in percent.
    pub fn progress(&self) -> ServiceResult<f64> {
        let record = self.today_or_create()?;
        Ok(progress_percent(
            f64::from(record.glasses_drunk),
            f64::from(record.target_glasses),
        ))
    }

    /// Mean daily completion over the trailing week, in `[0, 1]`.
    pub fn weekly_average(&self) -> ServiceResult<f64> {
        let today = self.today_date();
        let query = RecordQuery::all().limit(ROLLING_WINDOW_DAYS as u32);
        let days = self
            .repo
            .list(&query)?
            .into_iter()
            .map(|record| DayProgress {
                day: record.day,
                achieved: f64::from(record.glasses_drunk),
                target: f64::from(record.target_glasses),
            })
            .collect::<Vec<_>>();
        Ok(rolling_completion_rate(&days, today))
    }

    pub fn refresh(&self) -> ServiceResult<Vec<WaterIntake>> {
        load_into(&self.state, || self.find_today().map(|found| found.into_iter().collect()))
    }

    fn mutate_today(&self, apply: impl FnOnce(&mut WaterIntake)) -> ServiceResult<WaterIntake> {
        let result = self.today_or_create().and_then(|mut record| {
            apply(&mut record);
            self.repo.update(&mut record)?;
            Ok(record)
        });
        settle(&self.state, "water_service", result, || {
            self.find_today().map(|found| found.into_iter().collect())
        })
    }

    fn today_date(&self) -> NaiveDate {
        local_day(self.clock.now_ms(), &self.tz)
    }

    fn find_today(&self) -> ServiceResult<Option<WaterIntake>> {
        Ok(find_water_day(&self.repo, self.today_date())?)
    }

    fn today_or_create(&self) -> ServiceResult<WaterIntake> {
        Ok(open_water_day(&self.repo, self.today_date(), self.defaults)?)
    }
}
