use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::kernel::error::Result;
use crate::utils::fs::has_extension;

/// Filesystem collaborator used by discovery, capability checks, the cache
/// and the persistence store.
pub trait StorageProvider: Send + Sync + Debug {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Create a directory and all its parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read a file to a string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write a string to a file, replacing it atomically
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;

    /// Write bytes to a file, replacing it atomically
    fn write_bytes(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Remove a directory and all its contents
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// List all entries in a directory, sorted by path
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// List the immediate subdirectories of a directory, sorted by path
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .read_dir(path)?
            .into_iter()
            .filter(|entry| self.is_dir(entry))
            .collect())
    }

    /// First file (by sorted path) directly under `path` with the given extension
    fn first_file_with_extension(&self, path: &Path, extension: &str) -> Result<Option<PathBuf>> {
        if !self.is_dir(path) {
            return Ok(None);
        }
        Ok(self
            .read_dir(path)?
            .into_iter()
            .find(|entry| self.is_file(entry) && has_extension(entry, extension)))
    }
}
