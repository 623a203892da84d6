//! Feature use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Push fresh snapshots into each feature's [`StateHolder`] after every
//!   read or mutation.
//! - Keep UI/FFI layers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - A failed call publishes its message into the screen state and returns
//!   the same error to the caller.

use crate::state::StateHolder;
use log::warn;

pub mod assistant_service;
pub mod error;
pub mod expense_service;
pub mod note_service;
pub mod savings_service;
pub mod task_service;
pub mod water_service;

pub use assistant_service::AssistantService;
pub use error::{ServiceError, ServiceResult};
pub use expense_service::{ExpenseFilter, ExpenseService, ExportedReport};
pub use note_service::{derive_markdown_preview, MarkdownPreview, NoteService};
pub use savings_service::{SavingsProgress, SavingsService};
pub use task_service::{TaskFilter, TaskService};
pub use water_service::{WaterDefaults, WaterService};

/// Runs a list load and publishes loading, then items or the error.
pub(crate) fn load_into<T: Clone>(
    state: &StateHolder<T>,
    load: impl FnOnce() -> ServiceResult<Vec<T>>,
) -> ServiceResult<Vec<T>> {
    state.set_loading();
    match load() {
        Ok(items) => {
            state.publish_items(items.clone());
            Ok(items)
        }
        Err(err) => {
            state.publish_error(err.to_string());
            Err(err)
        }
    }
}

/// Settles a mutation: refreshes the screen on success, publishes the error
/// otherwise.
///
/// A failed refresh after a successful write is published but does not undo
/// the write's result.
pub(crate) fn settle<T: Clone, V>(
    state: &StateHolder<T>,
    module: &str,
    result: ServiceResult<V>,
    refresh: impl FnOnce() -> ServiceResult<Vec<T>>,
) -> ServiceResult<V> {
    match result {
        Ok(value) => {
            if let Err(err) = load_into(state, refresh) {
                warn!("event=state_refresh module={module} status=error error={err}");
            }
            Ok(value)
        }
        Err(err) => {
            state.publish_error(err.to_string());
            Err(err)
        }
    }
}
