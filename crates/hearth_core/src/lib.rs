//! Core domain logic for Hearth.
//! This crate is the single source of truth for household-record invariants,
//! reminder rules and progress arithmetic.

pub mod assistant;
pub mod calendar;
pub mod cipher;
pub mod clock;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod progress;
pub mod reminder;
pub mod repo;
pub mod scheduler;
pub mod search;
pub mod service;
pub mod state;

pub use assistant::{AssistantError, AssistantProvider, AssistantRegistry, AssistantTask};
pub use clock::{system_clock, Clock, FixedClock, SharedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use export::{JsonReportExporter, ReportExporter, TransactionReport};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::{RecordId, RecordMeta, TimeRange, ValidationError};
pub use reminder::{
    CollectingSink, Notification, NotificationId, NotificationSink, ReminderCategory,
    ReminderJob, ReminderReport, ReminderWorker,
};
pub use repo::record_repo::{RecordQuery, RepoError, RepoResult, Repository, SqliteRepository};
pub use scheduler::{JobOutcome, JobSchedule, Scheduler};
pub use search::fts::{search_notes, NoteSearchHit, NoteSearchQuery, SearchError};
pub use service::{ServiceError, ServiceResult};
pub use state::{ScreenState, StateHolder};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
