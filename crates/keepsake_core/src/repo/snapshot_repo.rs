//! Legacy local-persistence repository.
//!
//! # Responsibility
//! - Keep the whole collection as one JSON document under a fixed storage
//!   name, read once at open and rewritten on every mutation.
//! - Store photos inline as `data:` URLs (no bucket).
//!
//! # Invariants
//! - A missing document is initialized with the seed memories.
//! - The in-memory collection only changes after the document was rewritten.
//! - Ids are time-based and unique within the document.

use crate::model::memory::{ImagePayload, MemoryDraft, MemoryEntry, MemoryId};
use crate::model::seed::seed_memories;
use crate::remote::RemoteError;
use crate::repo::memory_repo::{MemoryRepository, ObjectKeyGenerator, RepoError, RepoResult};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Fixed storage name of the persisted collection.
pub const SNAPSHOT_STORAGE_KEY: &str = "noahMemories";

/// Repository persisting the collection as a single local JSON document.
pub struct SnapshotMemoryRepository {
    path: PathBuf,
    entries: Mutex<Vec<MemoryEntry>>,
    ids: ObjectKeyGenerator,
}

impl SnapshotMemoryRepository {
    /// Opens `<dir>/noahMemories.json`, seeding it when absent.
    ///
    /// # Errors
    /// - `RemoteRead` when the document exists but cannot be read or decoded,
    ///   or when the seeded document cannot be written.
    pub fn open(dir: impl AsRef<Path>) -> RepoResult<Self> {
        Self::open_with_ids(dir, ObjectKeyGenerator::system())
    }

    /// Same as `open`, with a caller-provided id generator.
    pub fn open_with_ids(dir: impl AsRef<Path>, ids: ObjectKeyGenerator) -> RepoResult<Self> {
        let path = snapshot_path(dir.as_ref());
        let entries = if path.exists() {
            let mut entries = read_snapshot(&path).map_err(RepoError::RemoteRead)?;
            entries.sort_by_key(|entry| entry.date);
            entries
        } else {
            let seeded = seed_memories();
            std::fs::create_dir_all(dir.as_ref())
                .map_err(|err| RepoError::RemoteRead(err.into()))?;
            write_snapshot(&path, &seeded).map_err(RepoError::RemoteRead)?;
            seeded
        };

        info!(
            "event=snapshot_open module=repo status=ok count={} path={}",
            entries.len(),
            path.display()
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
            ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> RepoResult<Vec<MemoryEntry>> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|_| {
                RepoError::RemoteRead(RemoteError::InvalidData(
                    "snapshot lock poisoned".to_string(),
                ))
            })
    }
}

impl MemoryRepository for SnapshotMemoryRepository {
    fn list_all(&self) -> RepoResult<Vec<MemoryEntry>> {
        self.snapshot()
    }

    fn create(&self, draft: &MemoryDraft, image: &ImagePayload) -> RepoResult<Vec<MemoryEntry>> {
        draft.validate()?;
        image.validate()?;

        let mut guard = self.entries.lock().map_err(|_| {
            RepoError::Insert(RemoteError::InvalidData(
                "snapshot lock poisoned".to_string(),
            ))
        })?;

        let mut next = guard.clone();
        let mut id = self.ids.next_millis();
        while next.iter().any(|entry| entry.id.0 == id) {
            id = self.ids.next_millis();
        }
        next.push(MemoryEntry::new(
            MemoryId(id),
            draft.title.as_str(),
            draft.date,
            draft.description.as_str(),
            image.to_data_url(),
        ));
        next.sort_by_key(|entry| entry.date);

        if let Err(err) = write_snapshot(&self.path, &next) {
            error!(
                "event=memory_create module=repo status=error stage=insert backend=snapshot error={}",
                err
            );
            return Err(RepoError::Insert(err));
        }

        info!(
            "event=memory_create module=repo status=ok backend=snapshot count={}",
            next.len()
        );
        *guard = next.clone();
        Ok(next)
    }
}

fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(format!("{SNAPSHOT_STORAGE_KEY}.json"))
}

fn read_snapshot(path: &Path) -> Result<Vec<MemoryEntry>, RemoteError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|err| RemoteError::InvalidData(format!("{}: {err}", path.display())))
}

/// Writes through a sibling temp file so a failed write keeps the old document.
fn write_snapshot(path: &Path, entries: &[MemoryEntry]) -> Result<(), RemoteError> {
    let encoded = serde_json::to_vec(entries)
        .map_err(|err| RemoteError::InvalidData(format!("snapshot encode: {err}")))?;
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, encoded)?;
    std::fs::rename(&staging, path)?;
    Ok(())
}
