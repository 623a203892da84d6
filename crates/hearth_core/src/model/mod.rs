//! Feature record models.
//!
//! # Responsibility
//! - Define one record type per feature (tasks, notes, savings goals,
//!   transactions, water intake, chat history).
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - `updated_at` is refreshed by the repository on every mutation.
//! - Monetary and quantity fields are finite and non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod chat;
pub mod note;
pub mod savings;
pub mod task;
pub mod transaction;
pub mod water;

/// Stable identifier shared by every record type.
pub type RecordId = Uuid;

/// Identity and timestamps carried by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: RecordId,
    /// Unix epoch milliseconds, stamped on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every mutation.
    pub updated_at: i64,
}

impl RecordMeta {
    /// Fresh identity; timestamps are stamped by the repository on insert.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: 0,
            updated_at: 0,
        }
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Half-open `[start_ms, end_ms)` window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// The `duration_ms` window ending at `end_ms`.
    pub fn trailing(end_ms: i64, duration_ms: i64) -> Self {
        Self {
            start_ms: end_ms - duration_ms,
            end_ms,
        }
    }

    pub fn contains(&self, instant_ms: i64) -> bool {
        instant_ms >= self.start_ms && instant_ms < self.end_ms
    }
}

/// Field-level validation failure, surfaced before any storage round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    BlankField(&'static str),
    NegativeValue { field: &'static str, value: f64 },
    NonPositiveValue { field: &'static str, value: f64 },
    NotFinite(&'static str),
    OutOfRange { field: &'static str, message: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::NegativeValue { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::NonPositiveValue { field, value } => {
                write!(f, "{field} must be greater than zero, got {value}")
            }
            Self::NotFinite(field) => write!(f, "{field} must be a finite number"),
            Self::OutOfRange { field, message } => write!(f, "{field} out of range: {message}"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    require_non_negative(field, value)?;
    if value == 0.0 {
        return Err(ValidationError::NonPositiveValue { field, value });
    }
    Ok(())
}

/// Rejects epoch milliseconds outside the range calendar math can represent.
pub(crate) fn require_instant(field: &'static str, value_ms: i64) -> Result<(), ValidationError> {
    if chrono::DateTime::from_timestamp_millis(value_ms).is_none() {
        return Err(ValidationError::OutOfRange {
            field,
            message: format!("{value_ms} is not a representable instant"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        require_instant, require_non_negative, require_positive, require_text, ValidationError,
    };

    #[test]
    fn amount_guards_reject_bad_values() {
        assert!(matches!(
            require_non_negative("amount", -1.0),
            Err(ValidationError::NegativeValue { .. })
        ));
        assert!(matches!(
            require_non_negative("amount", f64::NAN),
            Err(ValidationError::NotFinite("amount"))
        ));
        assert!(matches!(
            require_positive("amount", 0.0),
            Err(ValidationError::NonPositiveValue { .. })
        ));
        assert!(require_positive("amount", 0.5).is_ok());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            require_text("title", "  \n"),
            Err(ValidationError::BlankField("title"))
        );
    }

    #[test]
    fn instants_beyond_calendar_range_are_rejected() {
        assert!(require_instant("due_at", 1_717_200_000_000).is_ok());
        assert!(matches!(
            require_instant("due_at", i64::MAX),
            Err(ValidationError::OutOfRange { field: "due_at", .. })
        ));
    }
}
