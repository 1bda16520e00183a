use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::models::ProfileName;

/// Directory of profile records, one file per profile name.
///
/// Directory structure:
/// ```text
/// <store>/
///   pg1700000000123     # profile record (JSON)
///   staging             # profile record (JSON)
///   current             # pointer, see `CurrentPointer`
/// ```
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &ProfileName) -> PathBuf {
        self.dir.join(name.as_str())
    }

    /// Create the store directory if it is missing.
    ///
    /// Only the last path component is created; a missing ancestor fails with
    /// `DirectoryCreateFailed`.
    fn ensure_dir(&self) -> Result<()> {
        match fs::create_dir(&self.dir) {
            Ok(()) => {
                debug!(dir = %self.dir.display(), "Created store directory");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && self.dir.is_dir() => Ok(()),
            Err(source) => Err(StoreError::DirectoryCreateFailed {
                path: self.dir.clone(),
                source,
            }),
        }
    }

    /// Write a record, replacing any existing record of the same name.
    ///
    /// The bytes go to a temporary file in the store directory which is then
    /// renamed over the target, so readers see either the old or the new
    /// record in full.
    pub fn put(&self, name: &ProfileName, bytes: &[u8]) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path(name);

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| StoreError::io("create temporary file in", &self.dir, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io("write", tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::io("write", &path, e.error))?;

        debug!(path = %path.display(), "Wrote connection record");
        Ok(())
    }

    pub fn get(&self, name: &ProfileName) -> Result<Vec<u8>> {
        let path = self.path(name);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                name: name.to_string(),
            },
            _ => StoreError::io("read", &path, e),
        })
    }

    pub fn exists(&self, name: &ProfileName) -> Result<bool> {
        let path = self.path(name);
        match fs::symlink_metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io("inspect", &path, e)),
        }
    }

    /// Every entry in the store directory, including `current`.
    ///
    /// A store directory that does not exist yet lists as empty.
    pub fn list(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();

        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(StoreError::io("read store directory", &self.dir, e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io("read store directory", &self.dir, e))?;
            match entry.file_name().into_string() {
                Ok(name) => {
                    names.insert(name);
                }
                Err(raw) => warn!(entry = ?raw, "Skipping non UTF-8 store entry"),
            }
        }

        Ok(names)
    }

    /// Remove a record.
    ///
    /// Callers must clear or repoint the current pointer first if it targets
    /// `name`.
    pub fn delete(&self, name: &ProfileName) -> Result<()> {
        let path = self.path(name);
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                name: name.to_string(),
            },
            _ => StoreError::io("delete", &path, e),
        })?;
        debug!(path = %path.display(), "Deleted connection record");
        Ok(())
    }
}
