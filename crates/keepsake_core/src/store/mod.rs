//! In-process memory cache shared by all views.

pub mod memory_store;
