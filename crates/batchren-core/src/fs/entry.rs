//! File entry representation.

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::error::{CoreError, CoreResult};

/// A file or directory that is a candidate for renaming.
///
/// The name is the last path component, normalised to NFC so rules see
/// composed characters even on file systems that store names decomposed.
///
/// # Examples
///
/// ```no_run
/// use batchren_core::FileEntry;
/// use std::fs;
///
/// let metadata = fs::symlink_metadata("Cargo.toml").unwrap();
/// let entry = FileEntry::new("Cargo.toml".into(), &metadata);
/// assert_eq!(entry.name(), "Cargo.toml");
/// assert!(!entry.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

impl FileEntry {
    /// Creates a new `FileEntry` from a path and its metadata.
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().nfc().collect::<String>())
            .unwrap_or_default();

        Self {
            path,
            name,
            is_dir: metadata.is_dir(),
            is_symlink: metadata.is_symlink(),
        }
    }

    /// Reads the metadata of `path` (without following symlinks).
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if nothing exists at `path`.
    /// - [`CoreError::PermissionDenied`] if it cannot be inspected.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let metadata = std::fs::symlink_metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => {
                CoreError::PermissionDenied(path.to_path_buf())
            }
            _ => CoreError::Io(e),
        })?;
        Ok(Self::new(path.to_path_buf(), &metadata))
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file or directory name (last component of the path).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }
}
