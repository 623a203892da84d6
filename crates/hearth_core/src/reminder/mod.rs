//! Background reminder evaluation.
//!
//! # Responsibility
//! - Decide, per periodic wake-up, which local notifications should fire.
//! - Deliver them through a host-provided [`NotificationSink`].
//!
//! # Invariants
//! - Evaluation is idempotent: re-running a job re-sends notifications with
//!   the same ids, which replace rather than stack on the device.
//! - Different reminder kinds for one record never share a notification id.
//! - One failing record never stops evaluation of the others.

pub mod evaluator;
pub mod notification;
pub mod worker;

pub use notification::{
    CollectingSink, Notification, NotificationId, NotificationSink, ReminderCategory, SinkError,
};
pub use worker::{ItemFailure, ReminderJob, ReminderReport, ReminderWorker};
