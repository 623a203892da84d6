//! Task use-case service.
//!
//! # Responsibility
//! - Provide add/edit/toggle/delete/list/search APIs for tasks.
//! - Compute completion statistics over the trailing week.
//!
//! # Invariants
//! - `completed_at` is set exactly when `completed` is true.
//! - Lists keep incomplete tasks first, then by due date (undated last).

use crate::calendar::{local_day, start_of_day_ms};
use crate::clock::SharedClock;
use crate::model::task::Task;
use crate::model::{RecordId, TimeRange};
use crate::progress::{progress_fraction, ROLLING_WINDOW_DAYS};
use crate::repo::record_repo::{RecordQuery, Repository};
use crate::service::{load_into, settle, ServiceError, ServiceResult};
use crate::state::StateHolder;
use chrono::{Duration, FixedOffset};
use log::info;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::sync::Arc;

/// Status filter applied to task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    fn query(self) -> RecordQuery {
        match self {
            Self::All => RecordQuery::all(),
            Self::Active => RecordQuery::all().eq("completed", false),
            Self::Completed => RecordQuery::all().eq("completed", true),
        }
    }
}

/// Task service facade over a [`Repository`] implementation.
pub struct TaskService<R: Repository<Task>> {
    repo: R,
    clock: SharedClock,
    tz: FixedOffset,
    default_lead_days: u32,
    filter: Cell<TaskFilter>,
    state: Arc<StateHolder<Task>>,
}

impl<R: Repository<Task>> TaskService<R> {
    pub fn new(repo: R, clock: SharedClock, tz: FixedOffset) -> Self {
        Self {
            repo,
            clock,
            tz,
            default_lead_days: 1,
            filter: Cell::new(TaskFilter::All),
            state: Arc::new(StateHolder::new()),
        }
    }

    pub fn with_default_lead_days(mut self, days: u32) -> Self {
        self.default_lead_days = days;
        self
    }

    /// Screen state fed by this service.
    pub fn state(&self) -> Arc<StateHolder<Task>> {
        Arc::clone(&self.state)
    }

    /// New unsaved task carrying the configured defaults.
    pub fn draft(&self, title: impl Into<String>) -> Task {
        let mut task = Task::new(title);
        task.reminder_lead_days = self.default_lead_days;
        task
    }

    pub fn add(&self, mut task: Task) -> ServiceResult<Task> {
        if task.completed && task.completed_at.is_none() {
            task.completed_at = Some(self.clock.now_ms());
        }
        let result = self
            .repo
            .insert(&mut task)
            .map(|id| {
                info!("event=task_add module=service status=ok task_id={id}");
                task
            })
            .map_err(ServiceError::from);
        self.settle(result)
    }

    /// Replaces every editable field of an existing task.
    pub fn edit(&self, mut task: Task) -> ServiceResult<Task> {
        if !task.completed {
            task.completed_at = None;
        } else if task.completed_at.is_none() {
            task.completed_at = Some(self.clock.now_ms());
        }
        let result = self
            .repo
            .update(&mut task)
            .map(|()| task)
            .map_err(ServiceError::from);
        self.settle(result)
    }

    /// Flips completion, stamping or clearing `completed_at`.
    pub fn toggle_complete(&self, id: RecordId) -> ServiceResult<Task> {
        let result = self.require(id).and_then(|mut task| {
            let completed = !task.completed;
            task.set_completed(completed, self.clock.now_ms());
            self.repo.update(&mut task)?;
            info!(
                "event=task_toggle module=service status=ok task_id={id} completed={completed}"
            );
            Ok(task)
        });
        self.settle(result)
    }

    pub fn delete(&self, id: RecordId) -> ServiceResult<()> {
        let result = self.repo.delete(id).map_err(ServiceError::from);
        self.settle(result)
    }

    pub fn get(&self, id: RecordId) -> ServiceResult<Option<Task>> {
        Ok(self.repo.get(id)?)
    }

    /// Lists tasks by status and remembers the filter for later refreshes.
    pub fn list(&self, filter: TaskFilter) -> ServiceResult<Vec<Task>> {
        self.filter.set(filter);
        self.refresh()
    }

    /// Case-insensitive match over title and description, within the
    /// current status filter.
    pub fn search(&self, text: &str) -> ServiceResult<Vec<Task>> {
        let query = self.filter.get().query().matching(text);
        load_into(&self.state, || Ok(self.repo.list(&query)?))
    }

    /// Tasks whose due date falls inside `range`.
    pub fn due_between(&self, range: TimeRange) -> ServiceResult<Vec<Task>> {
        Ok(self.repo.list(&RecordQuery::all().within(range))?)
    }

    /// Share of tasks due in the trailing week (today included) that are
    /// completed; 0 when none were due.
    pub fn weekly_completion_rate(&self) -> ServiceResult<f64> {
        let today = local_day(self.clock.now_ms(), &self.tz);
        let window = TimeRange::new(
            start_of_day_ms(today - Duration::days(ROLLING_WINDOW_DAYS - 1), &self.tz),
            start_of_day_ms(today + Duration::days(1), &self.tz),
        );
        let due = self.due_between(window)?;
        let completed = due.iter().filter(|task| task.completed).count();
        Ok(progress_fraction(completed as f64, due.len() as f64))
    }

    /// Re-reads the current list into the screen state.
    pub fn refresh(&self) -> ServiceResult<Vec<Task>> {
        let query = self.filter.get().query();
        load_into(&self.state, || Ok(self.repo.list(&query)?))
    }

    fn require(&self, id: RecordId) -> ServiceResult<Task> {
        self.repo.get(id)?.ok_or(ServiceError::NotFound(id))
    }

    fn settle<V>(&self, result: ServiceResult<V>) -> ServiceResult<V> {
        let query = self.filter.get().query();
        settle(&self.state, "task_service", result, || {
            Ok(self.repo.list(&query)?)
        })
    }
}
