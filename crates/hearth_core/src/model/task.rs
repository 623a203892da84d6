//! To-do task model.

use super::{require_instant, require_text, RecordMeta, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub description: String,
    /// Epoch milliseconds; only the calendar day matters for reminders.
    pub due_at: Option<i64>,
    pub priority: TaskPriority,
    pub completed: bool,
    /// Set when `completed` flips to true, cleared when it flips back.
    pub completed_at: Option<i64>,
    /// Whether the daily reminder worker should nag about this task.
    pub daily_reminder: bool,
    /// Days before `due_at` when the "due soon" reminder fires.
    pub reminder_lead_days: u32,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::new(),
            title: title.into(),
            description: String::new(),
            due_at: None,
            priority: TaskPriority::default(),
            completed: false,
            completed_at: None,
            daily_reminder: false,
            reminder_lead_days: 1,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        if let Some(due_at) = self.due_at {
            require_instant("due_at", due_at)?;
        }
        if self.completed_at.is_some() && !self.completed {
            return Err(ValidationError::OutOfRange {
                field: "completed_at",
                message: "set on an incomplete task".to_string(),
            });
        }
        Ok(())
    }

    /// Flips completion and keeps `completed_at` consistent.
    pub fn set_completed(&mut self, completed: bool, now_ms: i64) {
        self.completed = completed;
        self.completed_at = completed.then_some(now_ms);
    }
}
