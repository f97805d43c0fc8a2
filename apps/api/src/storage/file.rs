//! JSON-file backend: one `<key>.json` per storage key under a data directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{KvBackend, StoreError};

pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates the data directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

/// Writes through a temp file in the same directory, then renames it over the target,
/// so readers never observe a half-written collection.
fn atomic_write(dir: &Path, path: &Path, value: &str) -> Result<(), StoreError> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(value.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl KvBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let value = value.to_string();
        tokio::task::spawn_blocking(move || atomic_write(&dir, &path, &value))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;
        debug!("Wrote '{key}' to {}", self.dir.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert!(backend.read("cvlm_versions").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let backend = FileBackend::open(dir.path()).unwrap();
            backend.write("lm_versions", "[1,2,3]").await.unwrap();
        }
        let reopened = FileBackend::open(dir.path()).unwrap();
        assert_eq!(
            reopened.read("lm_versions").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
        assert!(dir.path().join("lm_versions.json").exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.write("k", "first").await.unwrap();
        backend.write("k", "second").await.unwrap();
        assert_eq!(backend.read("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.write("k", "v").await.unwrap();
        backend.remove("k").await.unwrap();
        backend.remove("k").await.unwrap();
        assert!(backend.read("k").await.unwrap().is_none());
    }
}
