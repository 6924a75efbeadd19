//! Repository layer: entity mapping on top of the remote store.
//!
//! # Responsibility
//! - Define the `MemoryRepository` contract used by `MemoryStore`.
//! - Translate between row shapes and `MemoryEntry`.
//!
//! # Invariants
//! - Every repository returns collections sorted ascending by date.
//! - Failures are tagged by stage (`RemoteRead`, `Upload`, `Insert`).

pub mod memory_repo;
pub mod snapshot_repo;
