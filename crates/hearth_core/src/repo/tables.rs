//! Table bindings mapping each feature model onto its SQLite table.

use crate::model::chat::{ChatMessage, ChatRole};
use crate::model::note::Note;
use crate::model::savings::SavingsGoal;
use crate::model::task::{Task, TaskPriority};
use crate::model::transaction::{Transaction, TransactionKind};
use crate::model::water::{IntervalUnit, ReminderInterval, WaterIntake};
use crate::model::{RecordMeta, ValidationError};
use crate::repo::record_repo::{Record, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;

const DAY_FORMAT: &str = "%Y-%m-%d";

impl Record for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "due_at",
        "priority",
        "completed",
        "completed_at",
        "daily_reminder",
        "reminder_lead_days",
    ];
    const DATE_COLUMN: &'static str = "due_at";
    const SEARCH_COLUMNS: &'static [&'static str] = &["title", "description"];
    const ORDER_BY: &'static str =
        "completed ASC, due_at IS NULL ASC, due_at ASC, updated_at DESC, id ASC";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Task::validate(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(self.description.clone()),
            self.due_at.into(),
            Value::Text(self.priority.as_str().to_string()),
            self.completed.into(),
            self.completed_at.into(),
            self.daily_reminder.into(),
            Value::Integer(i64::from(self.reminder_lead_days)),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> RepoResult<Self> {
        let priority_text: String = row.get("priority")?;
        let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid priority `{priority_text}` in tasks.priority"))
        })?;
        let lead_days: i64 = row.get("reminder_lead_days")?;

        Ok(Task {
            meta,
            title: row.get("title")?,
            description: row.get("description")?,
            due_at: row.get("due_at")?,
            priority,
            completed: bool_column(row, "tasks", "completed")?,
            completed_at: row.get("completed_at")?,
            daily_reminder: bool_column(row, "tasks", "daily_reminder")?,
            reminder_lead_days: u32::try_from(lead_days).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid reminder_lead_days `{lead_days}` in tasks.reminder_lead_days"
                ))
            })?,
        })
    }
}

impl Record for Note {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] = &["title", "content", "preview_text", "preview_image"];
    const DATE_COLUMN: &'static str = "created_at";
    const SEARCH_COLUMNS: &'static [&'static str] = &["title", "content"];
    const ORDER_BY: &'static str = "updated_at DESC, id ASC";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Note::validate(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(self.content.clone()),
            self.preview_text.clone().into(),
            self.preview_image.clone().into(),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> RepoResult<Self> {
        Ok(Note {
            meta,
            title: row.get("title")?,
            content: row.get("content")?,
            preview_text: row.get("preview_text")?,
            preview_image: row.get("preview_image")?,
        })
    }
}

impl Record for SavingsGoal {
    const TABLE: &'static str = "savings_goals";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "target_amount",
        "saved_amount",
        "daily_saving",
        "deadline_at",
    ];
    const DATE_COLUMN: &'static str = "created_at";
    const SEARCH_COLUMNS: &'static [&'static str] = &["name"];
    const ORDER_BY: &'static str = "created_at DESC, id ASC";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        SavingsGoal::validate(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Real(self.target_amount),
            Value::Real(self.saved_amount),
            Value::Real(self.daily_saving),
            self.deadline_at.into(),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> RepoResult<Self> {
        Ok(SavingsGoal {
            meta,
            name: row.get("name")?,
            target_amount: row.get("target_amount")?,
            saved_amount: row.get("saved_amount")?,
            daily_saving: row.get("daily_saving")?,
            deadline_at: row.get("deadline_at")?,
        })
    }
}

impl Record for Transaction {
    const TABLE: &'static str = "transactions";
    const COLUMNS: &'static [&'static str] = &["kind", "category", "amount", "memo", "occurred_at"];
    const DATE_COLUMN: &'static str = "occurred_at";
    const SEARCH_COLUMNS: &'static [&'static str] = &["category", "memo"];
    const ORDER_BY: &'static str = "occurred_at DESC, id ASC";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Transaction::validate(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.kind.as_str().to_string()),
            Value::Text(self.category.clone()),
            Value::Real(self.amount),
            Value::Text(self.memo.clone()),
            Value::Integer(self.occurred_at),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> RepoResult<Self> {
        let kind_text: String = row.get("kind")?;
        let kind = TransactionKind::parse(&kind_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid kind `{kind_text}` in transactions.kind"))
        })?;

        Ok(Transaction {
            meta,
            kind,
            category: row.get("category")?,
            amount: row.get("amount")?,
            memo: row.get("memo")?,
            occurred_at: row.get("occurred_at")?,
        })
    }
}

impl Record for WaterIntake {
    const TABLE: &'static str = "water_intake";
    const COLUMNS: &'static [&'static str] = &[
        "day",
        "target_glasses",
        "glasses_drunk",
        "interval_value",
        "interval_unit",
        "last_drink_at",
        "last_reminded_at",
    ];
    const DATE_COLUMN: &'static str = "created_at";
    const SEARCH_COLUMNS: &'static [&'static str] = &[];
    const ORDER_BY: &'static str = "day DESC, id ASC";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        WaterIntake::validate(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(day_to_db(self.day)),
            Value::Integer(i64::from(self.target_glasses)),
            Value::Integer(i64::from(self.glasses_drunk)),
            Value::Integer(i64::from(self.interval.value)),
            Value::Text(self.interval.unit.as_str().to_string()),
            self.last_drink_at.into(),
            self.last_reminded_at.into(),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> RepoResult<Self> {
        let day_text: String = row.get("day")?;
        let day = NaiveDate::parse_from_str(&day_text, DAY_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!("invalid day `{day_text}` in water_intake.day"))
        })?;
        let unit_text: String = row.get("interval_unit")?;
        let unit = IntervalUnit::parse(&unit_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid interval unit `{unit_text}` in water_intake.interval_unit"
            ))
        })?;

        Ok(WaterIntake {
            meta,
            day,
            target_glasses: u32_column(row, "water_intake", "target_glasses")?,
            glasses_drunk: u32_column(row, "water_intake", "glasses_drunk")?,
            interval: ReminderInterval {
                value: u32_column(row, "water_intake", "interval_value")?,
                unit,
            },
            last_drink_at: row.get("last_drink_at")?,
            last_reminded_at: row.get("last_reminded_at")?,
        })
    }
}

impl Record for ChatMessage {
    const TABLE: &'static str = "chat_messages";
    const COLUMNS: &'static [&'static str] = &["role", "content"];
    const DATE_COLUMN: &'static str = "created_at";
    const SEARCH_COLUMNS: &'static [&'static str] = &["content"];
    const ORDER_BY: &'static str = "created_at ASC, rowid ASC";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationError> {
        ChatMessage::validate(self)
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.role.as_str().to_string()),
            Value::Text(self.content.clone()),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> RepoResult<Self> {
        let role_text: String = row.get("role")?;
        let role = ChatRole::parse(&role_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid role `{role_text}` in chat_messages.role"))
        })?;
        Ok(ChatMessage {
            meta,
            role,
            content: row.get("content")?,
        })
    }
}

/// Storage form of a calendar day (`YYYY-MM-DD`).
pub fn day_to_db(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn bool_column(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

fn u32_column(row: &Row<'_>, table: &str, column: &str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid count `{value}` in {table}.{column}"))
    })
}
