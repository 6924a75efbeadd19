//! Core domain logic for Keepsake, a milestone journal.
//! This crate is the single source of truth for memory entries, their
//! persistence and the view-models rendered by the UI shell.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod store;
pub mod view;

pub use bootstrap::{open_repository, open_store, BootstrapError, DynMemoryRepository};
pub use config::{AppConfig, BackendConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::memory::{
    format_long_date, month_label, parse_entry_date, ImagePayload, MemoryDraft, MemoryEntry,
    MemoryId, MemoryValidationError,
};
pub use model::seed::{seed_memories, PLACEHOLDER_IMAGE};
pub use remote::{
    BlobBucket, FsBlobBucket, MemoryRow, MemoryTable, NewMemoryRow, RemoteError, RemoteResult,
    RestConfig, RestRemoteStore, SqliteMemoryTable,
};
pub use repo::memory_repo::{
    MemoryRepository, ObjectKeyGenerator, RemoteMemoryRepository, RepoError, RepoResult,
};
pub use repo::snapshot_repo::{SnapshotMemoryRepository, SNAPSHOT_STORAGE_KEY};
pub use store::memory_store::{LoadState, MemoryStore, SubscriptionId};
pub use view::admin::{AdminForm, AdminSession, Redirect, SubmitOutcome, REDIRECT_DELAY};
pub use view::gallery::{GalleryItem, GalleryState};
pub use view::home::{latest_memory, HomeView};
pub use view::timeline::{group_by_month, MonthGroup, TimelineSection, TimelineState};
pub use view::{Notice, NoticeVariant, Route};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
