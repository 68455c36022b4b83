//! In-memory artifact store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bytes::Bytes;

use crate::artifact_store::{validate_artifact_name, ArtifactStore};
use crate::error::{StorageError, StorageResult};

/// Keeps artifacts in a map and counts writes.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<String, Bytes>>,
    writes: AtomicU64,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Sorted artifact names currently held.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.artifacts.lock() {
            Ok(map) => map.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.artifacts.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_artifact_name(name)?;
        let map = self.artifacts.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(map.contains_key(name))
    }

    fn put(&self, name: &str, data: Bytes) -> StorageResult<()> {
        validate_artifact_name(name)?;
        let mut map = self.artifacts.lock().map_err(|_| StorageError::Poisoned)?;
        map.insert(name.to_string(), data);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn get(&self, name: &str) -> StorageResult<Bytes> {
        validate_artifact_name(name)?;
        let map = self.artifacts.lock().map_err(|_| StorageError::Poisoned)?;
        map.get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn location(&self, name: &str) -> String {
        format!("memory://{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_writes() {
        let store = MemoryArtifactStore::new();
        assert!(store.is_empty());

        store.put("b.png", Bytes::from_static(b"b")).unwrap();
        store.put("a.png", Bytes::from_static(b"a")).unwrap();
        store.put("a.png", Bytes::from_static(b"A")).unwrap();

        assert_eq!(store.write_count(), 3);
        assert_eq!(store.len(), 2);
        assert_eq!(store.names(), vec!["a.png", "b.png"]);
        assert_eq!(store.get("a.png").unwrap().as_ref(), b"A");
    }

    #[test]
    fn test_exists() {
        let store = MemoryArtifactStore::new();
        assert!(!store.exists("x.png").unwrap());
        store.put("x.png", Bytes::new()).unwrap();
        assert!(store.exists("x.png").unwrap());
    }

    #[test]
    fn test_location() {
        assert_eq!(MemoryArtifactStore::new().location("x.png"), "memory://x.png");
    }
}
