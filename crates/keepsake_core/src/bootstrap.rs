//! Composition root: builds the repository and store for a configuration.

use crate::config::{AppConfig, BackendConfig};
use crate::db::{open_db, DbError};
use crate::remote::{FsBlobBucket, RemoteError, RestRemoteStore, SqliteMemoryTable};
use crate::repo::memory_repo::{MemoryRepository, RemoteMemoryRepository, RepoError};
use crate::repo::snapshot_repo::SnapshotMemoryRepository;
use crate::store::memory_store::MemoryStore;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Repository type shared by all backends.
pub type DynMemoryRepository = Box<dyn MemoryRepository + Send>;

#[derive(Debug)]
pub enum BootstrapError {
    Db(DbError),
    Remote(RemoteError),
    Repo(RepoError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database bootstrap failed: {err}"),
            Self::Remote(err) => write!(f, "remote store bootstrap failed: {err}"),
            Self::Repo(err) => write!(f, "repository bootstrap failed: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DbError> for BootstrapError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RemoteError> for BootstrapError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<RepoError> for BootstrapError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Builds the repository for the configured backend.
///
/// Does not contact the hosted backend; the first request happens on load.
pub fn open_repository(config: &AppConfig) -> Result<DynMemoryRepository, BootstrapError> {
    let backend = config.backend.kind();
    let repo = match &config.backend {
        BackendConfig::Rest(rest) => {
            let store = RestRemoteStore::new(rest);
            Ok(Box::new(RemoteMemoryRepository::new(store.clone(), store)) as DynMemoryRepository)
        }
        BackendConfig::Sqlite {
            db_path,
            blob_dir,
            public_base_url,
        } => open_sqlite(db_path, blob_dir, public_base_url.clone()),
        BackendConfig::Snapshot { dir } => SnapshotMemoryRepository::open(dir)
            .map(|repo| Box::new(repo) as DynMemoryRepository)
            .map_err(BootstrapError::from),
    };

    match &repo {
        Ok(_) => info!("event=bootstrap module=core status=ok backend={backend}"),
        Err(err) => error!("event=bootstrap module=core status=error backend={backend} error={err}"),
    }
    repo
}

fn open_sqlite(
    db_path: &Path,
    blob_dir: &Path,
    public_base_url: Option<String>,
) -> Result<DynMemoryRepository, BootstrapError> {
    let table = SqliteMemoryTable::try_new(open_db(db_path)?)?;
    let bucket = FsBlobBucket::try_new(blob_dir, public_base_url)?;
    Ok(Box::new(RemoteMemoryRepository::new(table, bucket)))
}

/// Builds a not-yet-loaded store for the configured backend.
pub fn open_store(config: &AppConfig) -> Result<MemoryStore<DynMemoryRepository>, BootstrapError> {
    open_repository(config).map(MemoryStore::new)
}
