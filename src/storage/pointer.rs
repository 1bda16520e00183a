use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::{ProfileName, CURRENT_ENTRY};

/// How the `current` entry is represented on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerStyle {
    /// `current` is a symlink to the profile file.
    Symlink,
    /// `current` is a regular file containing the profile name.
    File,
}

impl Default for PointerStyle {
    fn default() -> Self {
        if cfg!(unix) {
            PointerStyle::Symlink
        } else {
            PointerStyle::File
        }
    }
}

/// The `current` entry of a store directory.
///
/// Records a name-to-name relation only: it never owns or reads profile
/// contents, and `resolve` does not check that the target still exists.
#[derive(Debug, Clone)]
pub struct CurrentPointer {
    dir: PathBuf,
    style: PointerStyle,
}

impl CurrentPointer {
    pub fn new(dir: impl AsRef<Path>, style: PointerStyle) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            style,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CURRENT_ENTRY)
    }

    /// Name of the profile `current` points at, or `None` if there is no
    /// pointer.
    pub fn resolve(&self) -> Result<Option<ProfileName>> {
        let path = self.path();
        let metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io("inspect current pointer", &path, e)),
        };

        let target = match self.style {
            PointerStyle::Symlink => {
                if !metadata.file_type().is_symlink() {
                    return Err(invalid_pointer(&path, "current pointer is not a symlink"));
                }
                let dest = fs::read_link(&path)
                    .map_err(|e| StoreError::io("read current pointer", &path, e))?;
                dest.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| invalid_pointer(&path, "current pointer has no target name"))?
            }
            PointerStyle::File => {
                if !metadata.is_file() {
                    return Err(invalid_pointer(&path, "current pointer is not a regular file"));
                }
                let content = fs::read_to_string(&path)
                    .map_err(|e| StoreError::io("read current pointer", &path, e))?;
                // Only the newline `set` appends; names may carry spaces.
                content
                    .strip_suffix('\n')
                    .unwrap_or(&content)
                    .to_string()
            }
        };

        ProfileName::new(target)
            .map(Some)
            .map_err(|_| invalid_pointer(&path, "current pointer target is not a connection name"))
    }

    pub fn is_current(&self, name: &ProfileName) -> Result<bool> {
        Ok(self.resolve()?.as_ref() == Some(name))
    }

    /// Point `current` at `name`.
    ///
    /// The old pointer is removed before the new one is created. A crash in
    /// between leaves no pointer at all, never two.
    pub fn set(&self, name: &ProfileName) -> Result<()> {
        self.clear()?;

        let path = self.path();
        match self.style {
            PointerStyle::Symlink => link(name.as_str(), &path)
                .map_err(|e| StoreError::io("create current pointer", &path, e))?,
            PointerStyle::File => {
                let mut tmp = NamedTempFile::new_in(&self.dir)
                    .map_err(|e| StoreError::io("create temporary file in", &self.dir, e))?;
                writeln!(tmp, "{name}")
                    .map_err(|e| StoreError::io("write current pointer", tmp.path(), e))?;
                tmp.persist(&path)
                    .map_err(|e| StoreError::io("create current pointer", &path, e.error))?;
            }
        }

        debug!(target_name = %name, "Set current pointer");
        Ok(())
    }

    /// Remove the pointer. Absent pointers are fine.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed current pointer");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io("remove current pointer", &path, e)),
        }
    }
}

fn invalid_pointer(path: &Path, msg: &'static str) -> StoreError {
    StoreError::io(
        "read current pointer",
        path,
        io::Error::new(ErrorKind::InvalidData, msg),
    )
}

/// Create a symlink whose target is relative to the link's own directory.
#[cfg(unix)]
fn link(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn link(target: &str, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn link(_target: &str, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "symlinks are not supported on this platform; use pointer = \"file\"",
    ))
}
