//! Full-text search over notes.
//!
//! # Responsibility
//! - Expose keyword search APIs backed by SQLite FTS5.
//!
//! # Invariants
//! - Blank queries return an empty result set.

pub mod fts;
