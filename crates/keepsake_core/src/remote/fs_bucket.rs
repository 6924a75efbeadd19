//! Directory-backed photo bucket.

use super::{BlobBucket, RemoteError, RemoteResult};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Stores objects as flat files under one root directory.
///
/// Objects are written with create-new semantics, so an existing key is
/// reported as `Conflict` and never overwritten.
#[derive(Debug, Clone)]
pub struct FsBlobBucket {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobBucket {
    /// Creates the root directory if needed.
    ///
    /// `public_base_url` defaults to `file://<root>`.
    pub fn try_new(root: impl AsRef<Path>, public_base_url: Option<String>) -> RemoteResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        let public_base_url = public_base_url
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("file://{}", root.display()));
        Ok(Self {
            root,
            public_base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of `key`, or `None` for keys that are not flat names.
    pub fn object_path(&self, key: &str) -> Option<PathBuf> {
        let flat = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\'])
            && key != "..";
        flat.then(|| self.root.join(key))
    }
}

impl BlobBucket for FsBlobBucket {
    fn upload(&self, key: &str, bytes: &[u8], _content_type: &str) -> RemoteResult<()> {
        let path = self
            .object_path(key)
            .ok_or_else(|| RemoteError::InvalidData(format!("invalid object key `{key}`")))?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(RemoteError::Conflict(key.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::FsBlobBucket;
    use crate::remote::{BlobBucket, RemoteError};

    #[test]
    fn upload_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = FsBlobBucket::try_new(dir.path(), None).unwrap();

        bucket.upload("1.png", b"first", "image/png").unwrap();
        let err = bucket.upload("1.png", b"second", "image/png").unwrap_err();
        assert!(matches!(err, RemoteError::Conflict(key) if key == "1.png"));
        assert_eq!(std::fs::read(dir.path().join("1.png")).unwrap(), b"first");
    }

    #[test]
    fn upload_rejects_nested_keys() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = FsBlobBucket::try_new(dir.path(), None).unwrap();
        let err = bucket.upload("../escape.png", b"x", "image/png").unwrap_err();
        assert!(matches!(err, RemoteError::InvalidData(_)));
    }

    #[test]
    fn public_url_uses_configured_base() {
        let dir = tempfile::tempdir().unwrap();
        let bucket =
            FsBlobBucket::try_new(dir.path(), Some("https://cdn.example.com/photos/".to_string()))
                .unwrap();
        assert_eq!(
            bucket.public_url("1683000000000.jpg"),
            "https://cdn.example.com/photos/1683000000000.jpg"
        );
    }
}
