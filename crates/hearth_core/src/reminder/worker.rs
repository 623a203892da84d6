//! Reminder workers: read the store, evaluate, deliver.
//!
//! # Responsibility
//! - Map each [`ReminderJob`] onto the records it inspects.
//! - Isolate per-record failures and report them in [`ReminderReport`].
//! - Translate pass-level failures into [`JobOutcome::Retry`].
//!
//! # Invariants
//! - A record that fails to decode, deliver or update is logged and skipped;
//!   the rest of the batch is still evaluated.
//! - Water reminders stamp `last_reminded_at` only after delivery succeeded,
//!   touching no other column.
//! - The water job opens today's record itself, so the first wake-up of a
//!   day still sees the last glass logged the day before.

use crate::calendar::local_day;
use crate::clock::SharedClock;
use crate::db::open_db;
use crate::model::savings::SavingsGoal;
use crate::model::task::Task;
use crate::model::transaction::Transaction;
use crate::model::water::{WaterDefaults, WaterIntake};
use crate::model::RecordId;
use crate::reminder::evaluator::{
    savings_reminder, task_daily_reminder, task_due_reminder, transaction_reminder,
    transaction_window, water_reminder,
};
use crate::reminder::notification::{Notification, NotificationId, NotificationSink};
use crate::repo::record_repo::{RecordQuery, RepoError, RepoResult, Repository, SqliteRepository};
use crate::repo::water_days::{open_water_day, stamp_water_reminded};
use crate::scheduler::{JobOutcome, JobSchedule};
use chrono::FixedOffset;
use log::{info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One periodic reminder family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderJob {
    Water,
    TaskDaily,
    TaskDue,
    Savings,
    Transactions,
}

impl ReminderJob {
    pub const ALL: [ReminderJob; 5] = [
        Self::Water,
        Self::TaskDaily,
        Self::TaskDue,
        Self::Savings,
        Self::Transactions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Water => "water_reminder",
            Self::TaskDaily => "task_daily_reminder",
            Self::TaskDue => "task_due_reminder",
            Self::Savings => "savings_reminder",
            Self::Transactions => "transaction_reminder",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|job| job.name() == value || job.name().trim_end_matches("_reminder") == value)
    }

    /// Default wake-up cadence.
    pub fn cadence(self) -> Duration {
        const MINUTE: u64 = 60;
        match self {
            Self::Water => Duration::from_secs(15 * MINUTE),
            Self::TaskDaily | Self::TaskDue => Duration::from_secs(24 * 60 * MINUTE),
            Self::Savings | Self::Transactions => Duration::from_secs(60 * MINUTE),
        }
    }
}

/// A record that could not be evaluated in this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub record_id: Option<RecordId>,
    pub message: String,
}

/// Summary of one worker pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderReport {
    pub job: ReminderJob,
    pub evaluated: usize,
    pub fired: Vec<NotificationId>,
    pub failures: Vec<ItemFailure>,
}

impl ReminderReport {
    fn new(job: ReminderJob) -> Self {
        Self {
            job,
            evaluated: 0,
            fired: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, record_id: Option<RecordId>, message: impl Into<String>) {
        let message = message.into();
        warn!(
            "event=reminder_item module=reminder status=error job={} record_id={} error={}",
            self.job.name(),
            record_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            message
        );
        self.failures.push(ItemFailure { record_id, message });
    }
}

/// Evaluates reminder jobs against a store and delivers notifications.
#[derive(Clone)]
pub struct ReminderWorker {
    sink: Arc<dyn NotificationSink>,
    clock: SharedClock,
    tz: FixedOffset,
    water_defaults: WaterDefaults,
}

impl ReminderWorker {
    pub fn new(sink: Arc<dyn NotificationSink>, clock: SharedClock, tz: FixedOffset) -> Self {
        Self {
            sink,
            clock,
            tz,
            water_defaults: WaterDefaults::default(),
        }
    }

    /// Settings for the first water record when the table is empty.
    pub fn with_water_defaults(mut self, defaults: WaterDefaults) -> Self {
        self.water_defaults = defaults;
        self
    }

    /// Runs one pass of `job` on an open connection.
    ///
    /// # Errors
    /// Only pass-level failures (repository construction, SQL errors) are
    /// returned; per-record failures land in the report.
    pub fn run(&self, conn: &Connection, job: ReminderJob) -> RepoResult<ReminderReport> {
        let started_at = Instant::now();
        let mut report = ReminderReport::new(job);
        match job {
            ReminderJob::Water => self.run_water(conn, &mut report)?,
            ReminderJob::TaskDaily => self.run_task_daily(conn, &mut report)?,
            ReminderJob::TaskDue => self.run_task_due(conn, &mut report)?,
            ReminderJob::Savings => self.run_savings(conn, &mut report)?,
            ReminderJob::Transactions => self.run_transactions(conn, &mut report)?,
        }
        info!(
            "event=reminder_run module=reminder status=ok job={} evaluated={} fired={} failed={} duration_ms={}",
            job.name(),
            report.evaluated,
            report.fired.len(),
            report.failures.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Opens the store at `db_path`, runs `job`, and maps the result for the
    /// scheduler.
    pub fn run_job(&self, db_path: &Path, job: ReminderJob) -> JobOutcome {
        let conn = match open_db(db_path) {
            Ok(conn) => conn,
            Err(err) => return self.pass_failed(job, err.to_string()),
        };
        match self.run(&conn, job) {
            Ok(_) => JobOutcome::Success,
            Err(err) => self.pass_failed(job, err.to_string()),
        }
    }

    /// Default schedule for `job`.
    pub fn schedule_for(job: ReminderJob, retry_delay: Duration) -> JobSchedule {
        JobSchedule::every(job.cadence()).with_retry_delay(retry_delay)
    }

    fn pass_failed(&self, job: ReminderJob, message: String) -> JobOutcome {
        warn!(
            "event=reminder_run module=reminder status=error job={} error={}",
            job.name(),
            message
        );
        JobOutcome::Retry(message)
    }

    fn deliver(&self, report: &mut ReminderReport, record_id: Option<RecordId>, n: Notification) -> bool {
        match self.sink.deliver(&n) {
            Ok(()) => {
                report.fired.push(n.id);
                true
            }
            Err(err) => {
                report.fail(record_id, err.to_string());
                false
            }
        }
    }

    fn run_water(&self, conn: &Connection, report: &mut ReminderReport) -> RepoResult<()> {
        let repo = SqliteRepository::<WaterIntake>::try_with_clock(conn, self.clock.clone())?;
        let now = self.clock.now_ms();
        let today = local_day(now, &self.tz);

        report.evaluated += 1;
        let record = match open_water_day(&repo, today, self.water_defaults) {
            Ok(record) => record,
            Err(RepoError::InvalidData(message)) => {
                report.fail(None, message);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let Some(notification) = water_reminder(&record, now) else {
            return Ok(());
        };
        let id = record.meta.id;
        if !self.deliver(report, Some(id), notification) {
            return Ok(());
        }
        if let Err(err) = stamp_water_reminded(conn, id, now) {
            report.fail(Some(id), format!("failed to stamp last_reminded_at: {err}"));
        }
        Ok(())
    }

    fn run_task_daily(&self, conn: &Connection, report: &mut ReminderReport) -> RepoResult<()> {
        let repo = SqliteRepository::<Task>::try_with_clock(conn, self.clock.clone())?;
        let query = RecordQuery::all()
            .eq("completed", false)
            .eq("daily_reminder", true);

        for item in repo.scan(&query)? {
            report.evaluated += 1;
            match item {
                Ok(task) => {
                    if let Some(notification) = task_daily_reminder(&task) {
                        self.deliver(report, Some(task.meta.id), notification);
                    }
                }
                Err(err) => report.fail(None, err.to_string()),
            }
        }
        Ok(())
    }

    fn run_task_due(&self, conn: &Connection, report: &mut ReminderReport) -> RepoResult<()> {
        let repo = SqliteRepository::<Task>::try_with_clock(conn, self.clock.clone())?;
        let now = self.clock.now_ms();
        let query = RecordQuery::all().eq("completed", false);

        for item in repo.scan(&query)? {
            report.evaluated += 1;
            match item {
                Ok(task) => {
                    if let Some(notification) = task_due_reminder(&task, now, &self.tz) {
                        self.deliver(report, Some(task.meta.id), notification);
                    }
                }
                Err(err) => report.fail(None, err.to_string()),
            }
        }
        Ok(())
    }

    fn run_savings(&self, conn: &Connection, report: &mut ReminderReport) -> RepoResult<()> {
        let repo = SqliteRepository::<SavingsGoal>::try_with_clock(conn, self.clock.clone())?;
        let now = self.clock.now_ms();

        for item in repo.scan(&RecordQuery::all())? {
            report.evaluated += 1;
            match item {
                Ok(goal) => {
                    if let Some(notification) = savings_reminder(&goal, now) {
                        self.deliver(report, Some(goal.meta.id), notification);
                    }
                }
                Err(err) => report.fail(None, err.to_string()),
            }
        }
        Ok(())
    }

    fn run_transactions(&self, conn: &Connection, report: &mut ReminderReport) -> RepoResult<()> {
        let repo = SqliteRepository::<Transaction>::try_with_clock(conn, self.clock.clone())?;
        let now = self.clock.now_ms();
        let count = repo.count(&RecordQuery::all().within(transaction_window(now)))?;

        report.evaluated += 1;
        if let Some(notification) = transaction_reminder(count) {
            self.deliver(report, None, notification);
        }
        Ok(())
    }
}
