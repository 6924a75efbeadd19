//! Memory repository contracts and remote-store implementation.
//!
//! # Responsibility
//! - Map `memories` rows into `MemoryEntry` values sorted by date.
//! - Run the create pipeline: upload photo, insert row, refetch collection.
//!
//! # Invariants
//! - Drafts and payloads are validated before any remote call.
//! - A failed upload never reaches the insert step.
//! - A failed insert leaves the uploaded object in place (orphaned, logged).
//! - Returned collections are sorted ascending by date, stable for ties.

use crate::model::memory::{
    parse_entry_date, ImagePayload, MemoryDraft, MemoryEntry, MemoryId, MemoryValidationError,
};
use crate::remote::{BlobBucket, MemoryRow, MemoryTable, NewMemoryRow, RemoteError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub type RepoResult<T> = Result<T, RepoError>;

/// Clock returning Unix epoch milliseconds.
pub type EpochClock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Repository failure, tagged with the first stage that failed.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before any remote call.
    Validation(MemoryValidationError),
    /// Listing failed; callers keep their current collection.
    RemoteRead(RemoteError),
    /// Photo upload failed; nothing was inserted.
    Upload(RemoteError),
    /// Row insert failed after a successful upload.
    Insert(RemoteError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::RemoteRead(err) => write!(f, "failed to load memories: {err}"),
            Self::Upload(err) => write!(f, "failed to upload photo: {err}"),
            Self::Insert(err) => write!(f, "failed to save memory: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::RemoteRead(err) | Self::Upload(err) | Self::Insert(err) => Some(err),
        }
    }
}

impl From<MemoryValidationError> for RepoError {
    fn from(value: MemoryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl RepoError {
    /// Stable stage name used in log events and UI envelopes.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RemoteRead(_) => "read",
            Self::Upload(_) => "upload",
            Self::Insert(_) => "insert",
        }
    }
}

/// Repository interface consumed by `MemoryStore`.
pub trait MemoryRepository {
    /// Returns every entry sorted ascending by date.
    fn list_all(&self) -> RepoResult<Vec<MemoryEntry>>;
    /// Stores one new entry and returns the refreshed full collection.
    fn create(&self, draft: &MemoryDraft, image: &ImagePayload) -> RepoResult<Vec<MemoryEntry>>;
}

impl<R: MemoryRepository + ?Sized> MemoryRepository for Box<R> {
    fn list_all(&self) -> RepoResult<Vec<MemoryEntry>> {
        (**self).list_all()
    }

    fn create(&self, draft: &MemoryDraft, image: &ImagePayload) -> RepoResult<Vec<MemoryEntry>> {
        (**self).create(draft, image)
    }
}

/// Time-based object key generator.
///
/// Keys are `<epoch-millis>.<ext>`; the millisecond part never repeats within
/// one generator even when the clock does not advance.
pub struct ObjectKeyGenerator {
    clock: EpochClock,
    last_ms: AtomicI64,
}

impl ObjectKeyGenerator {
    pub fn new(clock: EpochClock) -> Self {
        Self {
            clock,
            last_ms: AtomicI64::new(0),
        }
    }

    /// Generator backed by the system clock.
    pub fn system() -> Self {
        Self::new(Box::new(epoch_millis_now))
    }

    /// Returns the next unique millisecond stamp.
    pub fn next_millis(&self) -> i64 {
        let now = (self.clock)();
        let previous = self
            .last_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }

    /// Returns the next object key for `extension`.
    pub fn next_key(&self, extension: &str) -> String {
        format!("{}.{extension}", self.next_millis())
    }
}

/// Current Unix epoch milliseconds; `0` if the system clock is before 1970.
pub fn epoch_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Repository over a remote table + bucket pair.
pub struct RemoteMemoryRepository<T: MemoryTable, B: BlobBucket> {
    table: T,
    bucket: B,
    keys: ObjectKeyGenerator,
}

impl<T: MemoryTable, B: BlobBucket> RemoteMemoryRepository<T, B> {
    pub fn new(table: T, bucket: B) -> Self {
        Self::with_key_generator(table, bucket, ObjectKeyGenerator::system())
    }

    /// Uses a caller-provided key generator (deterministic clocks in tests).
    pub fn with_key_generator(table: T, bucket: B, keys: ObjectKeyGenerator) -> Self {
        Self {
            table,
            bucket,
            keys,
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn bucket(&self) -> &B {
        &self.bucket
    }
}

impl<T: MemoryTable, B: BlobBucket> MemoryRepository for RemoteMemoryRepository<T, B> {
    fn list_all(&self) -> RepoResult<Vec<MemoryEntry>> {
        let started_at = Instant::now();
        let rows = self.table.select_ordered_by_date().map_err(|err| {
            warn!(
                "event=memory_list module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            RepoError::RemoteRead(err)
        })?;

        let entries = rows_to_entries(rows).map_err(RepoError::RemoteRead)?;
        info!(
            "event=memory_list module=repo status=ok count={} duration_ms={}",
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }

    fn create(&self, draft: &MemoryDraft, image: &ImagePayload) -> RepoResult<Vec<MemoryEntry>> {
        draft.validate()?;
        image.validate()?;

        let started_at = Instant::now();
        let key = self.keys.next_key(&image.extension());
        let content_type = image.resolved_content_type();
        info!(
            "event=memory_create module=repo status=start key={} bytes={}",
            key,
            image.bytes.len()
        );

        if let Err(err) = self.bucket.upload(&key, &image.bytes, &content_type) {
            error!(
                "event=memory_create module=repo status=error stage=upload key={} duration_ms={} error={}",
                key,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(RepoError::Upload(err));
        }

        let row = NewMemoryRow {
            title: draft.title.clone(),
            date: draft.date.format("%Y-%m-%d").to_string(),
            description: draft.description.clone(),
            image_url: self.bucket.public_url(&key),
        };
        if let Err(err) = self.table.insert(&row) {
            error!(
                "event=memory_create module=repo status=error stage=insert orphaned_key={} duration_ms={} error={}",
                key,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(RepoError::Insert(err));
        }

        info!(
            "event=memory_create module=repo status=ok key={} duration_ms={}",
            key,
            started_at.elapsed().as_millis()
        );
        self.list_all()
    }
}

/// Maps rows to entries and sorts them by date.
///
/// Rows arrive ordered from the store already; the stable sort only guards
/// backends that ignore the requested order.
pub fn rows_to_entries(rows: Vec<MemoryRow>) -> Result<Vec<MemoryEntry>, RemoteError> {
    let mut entries = rows
        .into_iter()
        .map(row_to_entry)
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.date);
    Ok(entries)
}

fn row_to_entry(row: MemoryRow) -> Result<MemoryEntry, RemoteError> {
    let date = parse_entry_date(&row.date).map_err(|_| {
        RemoteError::InvalidData(format!(
            "invalid date `{}` in memories.date for id {}",
            row.date, row.id
        ))
    })?;
    Ok(MemoryEntry::new(
        MemoryId(row.id),
        row.title,
        date,
        row.description,
        row.image_url,
    ))
}
