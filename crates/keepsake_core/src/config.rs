//! Runtime configuration resolved from `KEEPSAKE_*` environment variables.
//!
//! # Invariants
//! - Every value has a default except the hosted backend URL and key.
//! - Secrets (API key, admin password) never appear in `Debug` output.

use crate::remote::RestConfig;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

pub const ENV_BACKEND: &str = "KEEPSAKE_BACKEND";
pub const ENV_REMOTE_URL: &str = "KEEPSAKE_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "KEEPSAKE_REMOTE_KEY";
pub const ENV_TABLE: &str = "KEEPSAKE_TABLE";
pub const ENV_BUCKET: &str = "KEEPSAKE_BUCKET";
pub const ENV_DB_PATH: &str = "KEEPSAKE_DB_PATH";
pub const ENV_BLOB_DIR: &str = "KEEPSAKE_BLOB_DIR";
pub const ENV_PUBLIC_BASE_URL: &str = "KEEPSAKE_PUBLIC_BASE_URL";
pub const ENV_SNAPSHOT_DIR: &str = "KEEPSAKE_SNAPSHOT_DIR";
pub const ENV_ADMIN_PASSWORD: &str = "KEEPSAKE_ADMIN_PASSWORD";
pub const ENV_CHILD_NAME: &str = "KEEPSAKE_CHILD_NAME";

const DEFAULT_TABLE: &str = "memories";
const DEFAULT_BUCKET: &str = "memories";
const DEFAULT_DB_FILE_NAME: &str = "keepsake.sqlite3";
const DEFAULT_BLOB_DIR_NAME: &str = "keepsake-blobs";
const DEFAULT_ADMIN_PASSWORD: &str = "noah123";
const DEFAULT_CHILD_NAME: &str = "Noah";

/// Persistence backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Hosted table + bucket over HTTP.
    Rest(RestConfig),
    /// Local SQLite table + directory bucket.
    Sqlite {
        db_path: PathBuf,
        blob_dir: PathBuf,
        public_base_url: Option<String>,
    },
    /// Legacy single-document local persistence.
    Snapshot { dir: PathBuf },
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rest(_) => "rest",
            Self::Sqlite { .. } => "sqlite",
            Self::Snapshot { .. } => "snapshot",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Admin gate string. Compared in plain text on the client.
    pub admin_password: String,
    /// Name used in view headlines.
    pub child_name: String,
}

impl Debug for AppConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend", &self.backend)
            .field("admin_password", &"<redacted>")
            .field("child_name", &self.child_name)
            .finish()
    }
}

impl AppConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let temp_dir = std::env::temp_dir();

        let backend = match get(ENV_BACKEND)
            .unwrap_or_else(|| "sqlite".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "rest" => BackendConfig::Rest(RestConfig {
                url: get(ENV_REMOTE_URL).ok_or(ConfigError::Missing(ENV_REMOTE_URL))?,
                api_key: get(ENV_REMOTE_KEY).ok_or(ConfigError::Missing(ENV_REMOTE_KEY))?,
                table: get(ENV_TABLE).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                bucket: get(ENV_BUCKET).unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            }),
            "sqlite" => BackendConfig::Sqlite {
                db_path: get(ENV_DB_PATH)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| temp_dir.join(DEFAULT_DB_FILE_NAME)),
                blob_dir: get(ENV_BLOB_DIR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| temp_dir.join(DEFAULT_BLOB_DIR_NAME)),
                public_base_url: get(ENV_PUBLIC_BASE_URL),
            },
            "snapshot" => BackendConfig::Snapshot {
                dir: get(ENV_SNAPSHOT_DIR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| temp_dir.clone()),
            },
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            backend,
            admin_password: lookup(ENV_ADMIN_PASSWORD)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            child_name: get(ENV_CHILD_NAME).unwrap_or_else(|| DEFAULT_CHILD_NAME.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
    Missing(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unknown {ENV_BACKEND} `{value}`; expected rest|sqlite|snapshot"
            ),
            Self::Missing(name) => write!(f, "{name} must be set for the selected backend"),
        }
    }
}

impl Error for ConfigError {}
