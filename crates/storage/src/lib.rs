//! Artifact storage for forecast outputs.
//!
//! Provides a single [`ArtifactStore`] interface with:
//! - [`LocalArtifactStore`]: a directory on disk, written atomically
//! - [`MemoryArtifactStore`]: an in-process map, for tests and dry runs

pub mod artifact_store;
pub mod error;
pub mod local;
pub mod memory;

pub use artifact_store::{validate_artifact_name, ArtifactStore};
pub use error::{StorageError, StorageResult};
pub use local::LocalArtifactStore;
pub use memory::MemoryArtifactStore;
