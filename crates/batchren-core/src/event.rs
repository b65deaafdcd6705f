//! Changes to batch membership.
//!
//! Whatever discovers candidate entries (a directory walk, a file watcher, a
//! drag & drop handler) reports them as [`EntryChange`]s, which a
//! [`crate::preview::PreviewSession`] applies in order.

use std::path::PathBuf;

use crate::fs::entry::FileEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryChange {
    /// An entry joined the batch.
    Added(FileEntry),
    /// The entry at this path left the batch.
    Removed(PathBuf),
}

impl EntryChange {
    /// Path of the entry the change refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            EntryChange::Added(entry) => entry.path(),
            EntryChange::Removed(path) => path,
        }
    }
}
