//! Savings goal model.

use super::{require_non_negative, require_positive, require_text, RecordMeta, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub target_amount: f64,
    pub saved_amount: f64,
    /// Planned deposit per day, used for the days-to-target estimate.
    pub daily_saving: f64,
    pub deadline_at: Option<i64>,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            meta: RecordMeta::new(),
            name: name.into(),
            target_amount,
            saved_amount: 0.0,
            daily_saving: 0.0,
            deadline_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_positive("target_amount", self.target_amount)?;
        require_non_negative("saved_amount", self.saved_amount)?;
        require_non_negative("daily_saving", self.daily_saving)?;
        Ok(())
    }

    /// Amount still missing; zero once the target is met.
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.saved_amount).max(0.0)
    }

    pub fn is_reached(&self) -> bool {
        self.saved_amount >= self.target_amount
    }
}
