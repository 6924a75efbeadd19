//! Session-wide memory cache.
//!
//! # Responsibility
//! - Hold the latest known collection for every view.
//! - Route mutations through the repository and publish refreshed collections.
//!
//! # Invariants
//! - The cache only changes after a successful repository call.
//! - Every successful load or add notifies every live subscriber once.
//! - `current()` never performs I/O.

use crate::model::memory::{ImagePayload, MemoryDraft, MemoryEntry};
use crate::repo::memory_repo::{MemoryRepository, RepoResult};
use log::{info, warn};

/// Callback invoked with the refreshed collection.
pub type Subscriber = Box<dyn Fn(&[MemoryEntry]) + Send>;

/// Handle returned by `MemoryStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Load state of the cached collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No successful load yet.
    #[default]
    NotLoaded,
    /// Latest collection, sorted ascending by date.
    Loaded(Vec<MemoryEntry>),
}

impl LoadState {
    pub fn entries(&self) -> &[MemoryEntry] {
        match self {
            Self::NotLoaded => &[],
            Self::Loaded(entries) => entries,
        }
    }
}

/// Owned cache over one repository.
pub struct MemoryStore<R: MemoryRepository> {
    repo: R,
    state: LoadState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<R: MemoryRepository> MemoryStore<R> {
    /// Creates an empty, not-yet-loaded store.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: LoadState::NotLoaded,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Performs the first load. Equivalent to `refresh`.
    ///
    /// On failure the store stays `NotLoaded` and the error is returned so the
    /// caller can decide whether to surface it.
    pub fn init(&mut self) -> RepoResult<&[MemoryEntry]> {
        self.refresh()
    }

    /// Re-reads the full collection and publishes it.
    ///
    /// On failure the cached collection is left unchanged.
    pub fn refresh(&mut self) -> RepoResult<&[MemoryEntry]> {
        match self.repo.list_all() {
            Ok(entries) => {
                self.replace(entries);
                Ok(self.current())
            }
            Err(err) => {
                warn!(
                    "event=store_refresh module=store status=error stage={} loaded={} error={}",
                    err.stage(),
                    self.is_loaded(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Latest known collection; empty before the first successful load.
    pub fn current(&self) -> &[MemoryEntry] {
        self.state.entries()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    /// Creates one entry and publishes the refreshed collection.
    ///
    /// On failure the cache is untouched and the error is returned.
    pub fn add(&mut self, draft: &MemoryDraft, image: &ImagePayload) -> RepoResult<&[MemoryEntry]> {
        let entries = self.repo.create(draft, image).map_err(|err| {
            warn!(
                "event=store_add module=store status=error stage={} error={}",
                err.stage(),
                err
            );
            err
        })?;
        self.replace(entries);
        info!(
            "event=store_add module=store status=ok count={}",
            self.current().len()
        );
        Ok(self.current())
    }

    /// Registers a callback for every published collection.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, subscriber));
        id
    }

    /// Removes a callback. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(current, _)| *current != id);
        self.subscribers.len() != before
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn replace(&mut self, entries: Vec<MemoryEntry>) {
        self.state = LoadState::Loaded(entries);
        let entries = self.state.entries();
        for (_, subscriber) in &self.subscribers {
            subscriber(entries);
        }
    }
}
