//! Savings goal use-case service.
//!
//! # Responsibility
//! - Provide create/edit/deposit/delete/list APIs for savings goals.
//! - Project goals into progress views for the savings screen.
//!
//! # Invariants
//! - Deposits are strictly positive and only ever increase `saved_amount`.

use crate::model::savings::SavingsGoal;
use crate::model::{require_positive, RecordId};
use crate::progress::{estimated_days_to_target, progress_percent};
use crate::repo::record_repo::{RecordQuery, Repository};
use crate::service::{load_into, settle, ServiceError, ServiceResult};
use crate::state::StateHolder;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Read-only progress projection of one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsProgress {
    pub goal_id: RecordId,
    pub percent: f64,
    pub remaining: f64,
    /// Days of `daily_saving` still needed; 0 without a daily plan.
    pub estimated_days: u64,
    pub reached: bool,
}

impl SavingsProgress {
    pub fn of(goal: &SavingsGoal) -> Self {
        let remaining = goal.remaining();
        Self {
            goal_id: goal.meta.id,
            percent: progress_percent(goal.saved_amount, goal.target_amount),
            remaining,
            estimated_days: estimated_days_to_target(remaining, goal.daily_saving),
            reached: goal.is_reached(),
        }
    }
}

pub struct SavingsService<R: Repository<SavingsGoal>> {
    repo: R,
    state: Arc<StateHolder<SavingsGoal>>,
}

impl<R: Repository<SavingsGoal>> SavingsService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: Arc::new(StateHolder::new()),
        }
    }

    pub fn state(&self) -> Arc<StateHolder<SavingsGoal>> {
        Arc::clone(&self.state)
    }

    pub fn create(&self, mut goal: SavingsGoal) -> ServiceResult<SavingsGoal> {
        let result = self
            .repo
            .insert(&mut goal)
            .map(|_| goal)
            .map_err(ServiceError::from);
        self.settle(result)
    }

    pub fn edit(&self, mut goal: SavingsGoal) -> ServiceResult<SavingsGoal> {
        let result = self
            .repo
            .update(&mut goal)
            .map(|()| goal)
            .map_err(ServiceError::from);
        self.settle(result)
    }

    /// Adds `amount` to the goal's saved total.
    pub fn add_savings(&self, id: RecordId, amount: f64) -> ServiceResult<SavingsGoal> {
        let result = require_positive("amount", amount)
            .map_err(ServiceError::from)
            .and_then(|()| self.require(id))
            .and_then(|mut goal| {
                goal.saved_amount += amount;
                self.repo.update(&mut goal)?;
                info!(
                    "event=savings_deposit module=service status=ok goal_id={id} reached={}",
                    goal.is_reached()
                );
                Ok(goal)
            });
        self.settle(result)
    }

    pub fn delete(&self, id: RecordId) -> ServiceResult<()> {
        let result = self.repo.delete(id).map_err(ServiceError::from);
        self.settle(result)
    }

    pub fn get(&self, id: RecordId) -> ServiceResult<Option<SavingsGoal>> {
        Ok(self.repo.get(id)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<SavingsGoal>> {
        load_into(&self.state, || self.list_all())
    }

    pub fn progress(&self, id: RecordId) -> ServiceResult<SavingsProgress> {
        self.require(id).map(|goal| SavingsProgress::of(&goal))
    }

    fn list_all(&self) -> ServiceResult<Vec<SavingsGoal>> {
        Ok(self.repo.list(&RecordQuery::all())?)
    }

    fn require(&self, id: RecordId) -> ServiceResult<SavingsGoal> {
        self.repo.get(id)?.ok_or(ServiceError::NotFound(id))
    }

    fn settle<V>(&self, result: ServiceResult<V>) -> ServiceResult<V> {
        settle(&self.state, "savings_service", result, || self.list_all())
    }
}
