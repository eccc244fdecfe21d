//! In-memory storage implementation.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{CrocusError, Result};
use crate::storage::{Storage, check_name};

/// An in-memory storage implementation.
///
/// Backs `mem:` stores and tests. Contents vanish when the storage is
/// dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create an empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of files stored.
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    /// Get the total size of all files in bytes.
    pub fn total_size(&self) -> u64 {
        self.files.read().values().map(|d| d.len() as u64).sum()
    }

    /// Remove all files.
    pub fn clear(&self) {
        self.files.write().clear();
    }
}

impl Storage for MemoryStorage {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        check_name(name)?;
        self.files
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CrocusError::storage(format!("file not found: {}", name)))
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> Result<()> {
        check_name(name)?;
        self.files.write().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.files.read().contains_key(name)
    }

    fn delete(&self, name: &str) -> Result<()> {
        check_name(name)?;
        self.files.write().remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_round_trip() {
        let storage = MemoryStorage::new();

        storage.write_atomic("a.json", b"hello").unwrap();
        assert!(storage.exists("a.json"));
        assert_eq!(storage.read("a.json").unwrap(), b"hello");
        assert_eq!(storage.file_count(), 1);
        assert_eq!(storage.total_size(), 5);
    }

    #[test]
    fn test_read_missing_file() {
        let storage = MemoryStorage::new();
        assert!(storage.read("missing.json").is_err());
    }

    #[test]
    fn test_delete_and_clear() {
        let storage = MemoryStorage::new();

        storage.write_atomic("a.json", b"1").unwrap();
        storage.write_atomic("b.json", b"2").unwrap();

        storage.delete("a.json").unwrap();
        assert!(!storage.exists("a.json"));
        assert_eq!(storage.list().unwrap(), vec!["b.json"]);

        storage.clear();
        assert_eq!(storage.file_count(), 0);
    }
}
