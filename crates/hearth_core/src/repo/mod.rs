//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Provide one generic CRUD contract shared by every feature table.
//! - Isolate SQLite column mapping from service/business orchestration.
//!
//! # Invariants
//! - Repository writes call `validate()` before SQL mutations.
//! - Repository writes stamp timestamps; callers never set them.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod record_repo;
pub mod tables;
pub mod water_days;
