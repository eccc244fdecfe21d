//! Storage backends for collection snapshots.
//!
//! A [`Storage`] holds whole-file blobs under a flat namespace. Collection
//! state is persisted as JSON snapshots written atomically, so the trait
//! works at file granularity instead of exposing streaming readers and
//! writers.

pub mod file;
pub mod memory;

use crate::error::{CrocusError, Result};

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A trait for storage backends that hold named blobs.
///
/// Implementations must tolerate concurrent readers; writers are serialized
/// by the caller.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Read the full contents of a file.
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Write a file, replacing any previous contents atomically.
    ///
    /// Readers observe either the old contents or the new contents, never a
    /// partial write.
    fn write_atomic(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Check if a file exists.
    fn exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete(&self, name: &str) -> Result<()>;

    /// List all file names in the storage.
    fn list(&self) -> Result<Vec<String>>;

    /// Sync pending writes to durable media where the backend has any.
    fn sync(&self) -> Result<()>;
}

/// Validate a file name for the flat namespace.
///
/// Names must not be empty and must not contain path separators, so a
/// backend can map them directly to directory entries.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CrocusError::storage("file name must not be empty"));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(CrocusError::storage(format!(
            "invalid file name: {}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name() {
        assert!(check_name("manifest.json").is_ok());
        assert!(check_name("reviews.segment.json").is_ok());

        assert!(check_name("").is_err());
        assert!(check_name("a/b").is_err());
        assert!(check_name("a\\b").is_err());
        assert!(check_name("..").is_err());
    }
}
