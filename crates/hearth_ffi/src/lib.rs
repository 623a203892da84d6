//! Flutter-facing bindings for Hearth core.

pub mod api;
