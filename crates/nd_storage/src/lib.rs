use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use nd_core::{Error, RecordStorage, Result};
use tracing::info;

pub mod backends;

pub use backends::*;

/// The storage backends a run can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Pretty-printed JSON files under a data directory.
    File,
    /// Process-local; nothing survives the run.
    Memory,
}

impl StorageBackend {
    pub fn description(&self) -> &'static str {
        match self {
            StorageBackend::File => "JSON files on disk",
            StorageBackend::Memory => "in-memory (not persisted)",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::File => f.write_str("file"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(Error::Config(format!(
                "unknown storage backend '{}'; expected 'file' or 'memory'",
                other
            ))),
        }
    }
}

/// Builds the record storage named by `kind`, rooted at `data_dir` for file storage.
pub fn create_storage(kind: &str, data_dir: impl AsRef<Path>) -> Result<Arc<dyn RecordStorage>> {
    let backend: StorageBackend = kind.parse()?;
    let storage: Arc<dyn RecordStorage> = match backend {
        StorageBackend::File => Arc::new(JsonFileStorage::new(data_dir.as_ref())),
        StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
    };
    info!("🏦 Storage backend: {}", backend.description());
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
