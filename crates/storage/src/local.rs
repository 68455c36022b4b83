//! Directory-backed artifact store.

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::artifact_store::{validate_artifact_name, ArtifactStore};
use crate::error::{StorageError, StorageResult};

/// Stores each artifact as a file directly under a root directory.
///
/// Writes go to a temp file in the same directory which is then renamed
/// over the destination, so an interrupted write never leaves a truncated
/// artifact behind under its final name.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| StorageError::io(root.display().to_string(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path an artifact lives at.
    pub fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        validate_artifact_name(name)?;
        Ok(self.root.join(name))
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.path_for(name)?;
        path.try_exists()
            .map_err(|e| StorageError::io(path.display().to_string(), e))
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    fn put(&self, name: &str, data: Bytes) -> StorageResult<()> {
        let path = self.path_for(name)?;
        let io_err = |e: std::io::Error| StorageError::io(path.display().to_string(), e);

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(io_err)?;
        tmp.write_all(&data).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        debug!(path = %path.display(), "Wrote artifact");
        Ok(())
    }

    fn get(&self, name: &str) -> StorageResult<Bytes> {
        let path = self.path_for(name)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::io(path.display().to_string(), e)),
        }
    }

    fn location(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::temp_test_dir;

    #[test]
    fn test_put_then_exists_and_get() {
        let dir = temp_test_dir();
        let store = LocalArtifactStore::new(dir.path()).unwrap();

        assert!(!store.exists("sic_mean.20230725.png").unwrap());
        store
            .put("sic_mean.20230725.png", Bytes::from_static(b"png"))
            .unwrap();

        assert!(store.exists("sic_mean.20230725.png").unwrap());
        assert_eq!(store.get("sic_mean.20230725.png").unwrap().as_ref(), b"png");
        assert!(dir.path().join("sic_mean.20230725.png").is_file());
    }

    #[test]
    fn test_put_overwrites() {
        let dir = temp_test_dir();
        let store = LocalArtifactStore::new(dir.path()).unwrap();

        store.put("a.json", Bytes::from_static(b"1")).unwrap();
        store.put("a.json", Bytes::from_static(b"22")).unwrap();

        assert_eq!(store.get("a.json").unwrap().as_ref(), b"22");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = temp_test_dir();
        let store = LocalArtifactStore::new(dir.path()).unwrap();
        store.put("a.json", Bytes::from_static(b"{}")).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_creates_missing_root() {
        let dir = temp_test_dir();
        let nested = dir.path().join("plots").join("north");
        let store = LocalArtifactStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.root(), nested.as_path());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let dir = temp_test_dir();
        let store = LocalArtifactStore::new(dir.path()).unwrap();
        assert!(matches!(store.get("nope.png"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = temp_test_dir();
        let store = LocalArtifactStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.put("../evil.png", Bytes::new()),
            Err(StorageError::InvalidName(_))
        ));
    }
}
