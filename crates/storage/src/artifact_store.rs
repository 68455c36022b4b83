//! The storage interface used by output processors.

use bytes::Bytes;

use crate::error::{StorageError, StorageResult};

/// A flat namespace of named output artifacts.
///
/// Implementations must make `put` atomic: readers either see no artifact
/// under a name or the complete bytes, never a partial write.
pub trait ArtifactStore: Send + Sync {
    /// Whether an artifact with this name already exists.
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Store `data` under `name`, replacing any previous artifact.
    fn put(&self, name: &str, data: Bytes) -> StorageResult<()>;

    /// Read an artifact back.
    fn get(&self, name: &str) -> StorageResult<Bytes>;

    /// Human-readable location of an artifact, for logs.
    fn location(&self, name: &str) -> String;
}

/// Artifact names are single path components: no separators, no `..`.
pub fn validate_artifact_name(name: &str) -> StorageResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        Err(StorageError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_artifact_name("sic_mean.20230725.png").is_ok());
        assert!(validate_artifact_name("output_trend.20230724.json").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", ".", "..", "../escape.png", "a/b.png", "a\\b.png"] {
            assert!(validate_artifact_name(name).is_err(), "{:?} should be rejected", name);
        }
    }
}
