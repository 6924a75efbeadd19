//! Domain model for recorded milestones.
//!
//! # Responsibility
//! - Define the canonical memory entry shared by every view.
//! - Keep date derivations (month label, long display date) pure.
//!
//! # Invariants
//! - Every entry is identified by a server-assigned `MemoryId`.
//! - Entries are append-only; no mutation or deletion helpers exist.

pub mod memory;
pub mod seed;
