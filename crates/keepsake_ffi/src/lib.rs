//! Flutter-facing bindings for Keepsake.

pub mod api;
