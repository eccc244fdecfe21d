//! File-based storage implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{CrocusError, Result};
use crate::storage::{Storage, check_name};

/// A file-based storage rooted at a directory.
///
/// Each blob is a regular file directly under the root. Writes go through a
/// temporary file in the same directory followed by a rename, so a crash
/// mid-write never leaves a truncated snapshot behind.
#[derive(Debug)]
pub struct FileStorage {
    /// The root directory for storage.
    directory: PathBuf,
}

impl FileStorage {
    /// Create a file storage in the given directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(|e| {
                CrocusError::storage(format!(
                    "failed to create directory {}: {}",
                    directory.display(),
                    e
                ))
            })?;
        }

        if !directory.is_dir() {
            return Err(CrocusError::storage(format!(
                "path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage { directory })
    }

    /// Get the root directory of this storage.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

impl Storage for FileStorage {
    fn read(&self, name: &str) -> Result<Vec<u8>> {
        check_name(name)?;
        let path = self.file_path(name);
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CrocusError::storage(format!("file not found: {}", name))
            } else {
                CrocusError::storage(format!("failed to read {}: {}", name, e))
            }
        })
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> Result<()> {
        check_name(name)?;

        // The temp file must live in the target directory so the final
        // rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(&self.directory)
            .map_err(|e| CrocusError::storage(format!("failed to create temp file: {}", e)))?;
        tmp.write_all(data)
            .map_err(|e| CrocusError::storage(format!("failed to write {}: {}", name, e)))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| CrocusError::storage(format!("failed to sync {}: {}", name, e)))?;
        tmp.persist(self.file_path(name))
            .map_err(|e| CrocusError::storage(format!("failed to persist {}: {}", name, e)))?;
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.file_path(name).is_file()
    }

    fn delete(&self, name: &str) -> Result<()> {
        check_name(name)?;
        let path = self.file_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CrocusError::storage(format!(
                "failed to delete {}: {}",
                name, e
            ))),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            CrocusError::storage(format!(
                "failed to list {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| CrocusError::storage(format!("failed to list entry: {}", e)))?;
            if entry.path().is_file()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn sync(&self) -> Result<()> {
        // Individual writes sync on persist; directory metadata is left to
        // the OS.
        Ok(())
    }
}
