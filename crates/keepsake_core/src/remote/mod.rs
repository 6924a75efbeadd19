//! Remote store seam: the durable `memories` table and the photo bucket.
//!
//! # Responsibility
//! - Define the row shapes exchanged with the table.
//! - Define the table/bucket contracts consumed by the repository.
//! - Provide hosted (REST) and local (SQLite + directory) adapters.
//!
//! # Invariants
//! - Reads return rows ordered by `date` ascending.
//! - Inserts never carry an `id`; the store assigns it.
//! - Bucket uploads never overwrite an existing object.

use crate::db::DbError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fs_bucket;
pub mod rest;
pub mod sqlite;

pub use fs_bucket::FsBlobBucket;
pub use rest::{RestConfig, RestRemoteStore};
pub use sqlite::SqliteMemoryTable;

/// Columns selected by the read path, in wire order.
pub const MEMORY_COLUMNS: &str = "id,title,date,description,image_url";

pub type RemoteResult<T> = Result<T, RemoteError>;

/// One row as stored in the `memories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRow {
    pub id: i64,
    pub title: String,
    /// `date` or `timestamp` column rendered as text.
    pub date: String,
    pub description: String,
    pub image_url: String,
}

/// Insert payload for the `memories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMemoryRow {
    pub title: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub description: String,
    pub image_url: String,
}

/// Durable table contract.
pub trait MemoryTable {
    /// Returns every row ordered by `date` ascending.
    fn select_ordered_by_date(&self) -> RemoteResult<Vec<MemoryRow>>;
    /// Inserts one row.
    fn insert(&self, row: &NewMemoryRow) -> RemoteResult<()>;
}

/// Publicly readable object bucket contract.
pub trait BlobBucket {
    /// Stores `bytes` under `key`; an existing key is a `Conflict`.
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> RemoteResult<()>;
    /// Returns the public URL for `key`. Does not check existence.
    fn public_url(&self, key: &str) -> String;
}

/// Transport/storage failure reported by an adapter.
#[derive(Debug)]
pub enum RemoteError {
    /// Non-success HTTP status.
    Http { status: u16, message: String },
    /// Request never produced a response.
    Transport(String),
    Db(DbError),
    Io(std::io::Error),
    /// Object key already present in the bucket.
    Conflict(String),
    /// Response or row could not be decoded.
    InvalidData(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Conflict(key) => write!(f, "object already exists: {key}"),
            Self::InvalidData(message) => write!(f, "invalid remote data: {message}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RemoteError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
