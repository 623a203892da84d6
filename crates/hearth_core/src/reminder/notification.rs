//! Notification contract shared with the host platform.

use crate::model::RecordId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

/// Per-category id block size; a record's slot lives inside its block.
const SLOT_COUNT: u32 = 1_000_000;

/// Reminder family; each owns a disjoint block of notification ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderCategory {
    Water,
    TransactionStale,
    SavingsStale,
    TaskDaily,
    TaskDueSoon,
    TaskDueToday,
    TaskOverdue,
}

impl ReminderCategory {
    pub const ALL: [ReminderCategory; 7] = [
        Self::Water,
        Self::TransactionStale,
        Self::SavingsStale,
        Self::TaskDaily,
        Self::TaskDueSoon,
        Self::TaskDueToday,
        Self::TaskOverdue,
    ];

    /// Additive id offset for this category.
    pub fn offset(self) -> u32 {
        let block = match self {
            Self::Water => 1,
            Self::TransactionStale => 2,
            Self::SavingsStale => 3,
            Self::TaskDaily => 4,
            Self::TaskDueSoon => 5,
            Self::TaskDueToday => 6,
            Self::TaskOverdue => 7,
        };
        block * SLOT_COUNT
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::TransactionStale => "transaction_stale",
            Self::SavingsStale => "savings_stale",
            Self::TaskDaily => "task_daily",
            Self::TaskDueSoon => "task_due_soon",
            Self::TaskDueToday => "task_due_today",
            Self::TaskOverdue => "task_overdue",
        }
    }
}

/// Platform notification id; fits in a signed 32-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub u32);

impl NotificationId {
    /// Id for `category`, optionally keyed by a record.
    pub fn for_record(category: ReminderCategory, record: Option<RecordId>) -> Self {
        let slot = record.map_or(0, |id| (id.as_u128() % u128::from(SLOT_COUNT)) as u32);
        Self(category.offset() + slot)
    }

    pub fn category(self) -> Option<ReminderCategory> {
        ReminderCategory::ALL
            .into_iter()
            .find(|category| self.0 / SLOT_COUNT == category.offset() / SLOT_COUNT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub category: ReminderCategory,
    pub title: String,
    pub body: String,
    /// In-app route opened when the notification is tapped.
    pub deep_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError(pub String);

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification delivery failed: {}", self.0)
    }
}

impl Error for SinkError {}

/// Fire-and-forget delivery of local notifications (host platform).
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError>;
}

/// Sink that keeps delivered notifications in memory.
///
/// Used by the FFI layer to hand notifications back to the host and by tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    delivered: Mutex<Vec<Notification>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains everything delivered so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationSink for CollectingSink {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        self.lock().push(notification.clone());
        Ok(())
    }
}
