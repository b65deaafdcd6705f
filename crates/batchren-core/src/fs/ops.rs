//! Collecting candidate entries and renaming them on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;

/// Which kinds of entries take part in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileTypeMode {
    #[default]
    FilesAndFolders,
    FilesOnly,
    FoldersOnly,
}

impl FileTypeMode {
    pub fn accepts(self, entry: &FileEntry) -> bool {
        match self {
            FileTypeMode::FilesAndFolders => true,
            FileTypeMode::FilesOnly => !entry.is_dir(),
            FileTypeMode::FoldersOnly => entry.is_dir(),
        }
    }
}

/// Reads the immediate contents of a directory and returns them as [`FileEntry`] values.
///
/// The returned entries are **unsorted**.
///
/// # Errors
///
/// - [`CoreError::NotFound`]: the path does not exist.
/// - [`CoreError::NotADirectory`]: the path is not a directory.
/// - [`CoreError::PermissionDenied`]: read access is denied.
/// - [`CoreError::Io`]: any other I/O error.
pub fn read_directory(path: &Path) -> CoreResult<Vec<FileEntry>> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(CoreError::NotADirectory(path.to_path_buf()));
    }

    let mut entries = Vec::new();

    let read_dir = std::fs::read_dir(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            CoreError::PermissionDenied(path.to_path_buf())
        } else {
            CoreError::Io(e)
        }
    })?;

    for dir_entry in read_dir {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let metadata = match dir_entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        entries.push(FileEntry::new(dir_entry.path(), &metadata));
    }

    Ok(entries)
}

/// Expands paths given by the user into batch entries.
///
/// A file is taken as is. A directory contributes its children, and with
/// `recursive` every entry below it. Entries rejected by `file_type` are
/// left out (their children are still visited). Each path appears at most
/// once.
///
/// # Errors
///
/// Fails on the first path that does not exist or cannot be read.
/// Unreadable entries below a directory are skipped.
pub fn collect_entries(
    paths: &[PathBuf],
    recursive: bool,
    file_type: FileTypeMode,
) -> CoreResult<Vec<FileEntry>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for path in paths {
        let entry = FileEntry::from_path(path)?;
        if entry.is_dir() {
            for child in read_directory(path)? {
                collect_recursive(child, recursive, file_type, &mut seen, &mut out);
            }
        } else if file_type.accepts(&entry) && seen.insert(entry.path().to_path_buf()) {
            out.push(entry);
        }
    }

    Ok(out)
}

fn collect_recursive(
    entry: FileEntry,
    recursive: bool,
    file_type: FileTypeMode,
    seen: &mut HashSet<PathBuf>,
    out: &mut Vec<FileEntry>,
) {
    let descend = recursive && entry.is_dir();
    let path = entry.path().to_path_buf();

    if file_type.accepts(&entry) && seen.insert(path.clone()) {
        out.push(entry);
    }
    if !descend {
        return;
    }

    match read_directory(&path) {
        Ok(children) => {
            for child in children {
                collect_recursive(child, recursive, file_type, seen, out);
            }
        }
        Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
    }
}

/// Resolves a proposed name against the source's directory.
///
/// Names containing `/` address a path below that directory.
pub fn target_path(source: &Path, target: &str) -> PathBuf {
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    parent.join(target.trim_start_matches('/'))
}

/// Returns `true` if something (including a dangling symlink) already
/// exists where `target` would put the entry.
///
/// The source itself does not count, so case-only renames pass on
/// case-insensitive file systems.
pub fn target_exists(source: &Path, target: &str) -> bool {
    let path = target_path(source, target);
    std::fs::symlink_metadata(&path).is_ok() && !is_same_entry(source, &path)
}

#[cfg(unix)]
fn is_same_entry(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::symlink_metadata(a), std::fs::symlink_metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_entry(_a: &Path, _b: &Path) -> bool {
    false
}

/// Renames `source` to `target` (resolved with [`target_path`]).
///
/// Missing intermediate directories of a sub-path target are created.
/// Existing entries are never overwritten. Returns the new path.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `source` does not exist.
/// - [`CoreError::InvalidName`] if `target` cannot name an entry.
/// - [`CoreError::AlreadyExists`] if the new path is taken.
/// - [`CoreError::PermissionDenied`] / [`CoreError::Io`] on I/O failure.
pub fn rename_entry(source: &Path, target: &str) -> CoreResult<PathBuf> {
    // Use symlink_metadata to avoid TOCTOU and handle symlinks correctly
    if std::fs::symlink_metadata(source).is_err() {
        return Err(CoreError::NotFound(source.to_path_buf()));
    }

    let trimmed = target.trim_matches('/');
    if trimmed.is_empty() || trimmed.contains('\0') || trimmed.split('/').any(|c| c == "..") {
        return Err(CoreError::InvalidName(target.to_string()));
    }

    let new_path = target_path(source, target);
    if target_exists(source, target) {
        return Err(CoreError::AlreadyExists(new_path));
    }

    if let Some(parent) = new_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| map_io(e, parent))?;
        }
    }

    std::fs::rename(source, &new_path).map_err(|e| map_io(e, source))?;
    Ok(new_path)
}

fn map_io(e: std::io::Error, path: &Path) -> CoreError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
        std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
        _ => CoreError::Io(e),
    }
}

/// Strict validity check for a single name component.
///
/// Rejects empty names, `.`, `..`, path separators and NUL bytes (and
/// `\` and `:` on Windows).
pub fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.contains('/') || name.contains('\0') {
        return false;
    }
    #[cfg(windows)]
    if name.contains('\\') || name.contains(':') {
        return false;
    }
    true
}
