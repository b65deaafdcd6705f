//! One entry of a batch and the name proposed for it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fs::entry::FileEntry;
use crate::fs::ops::{is_valid_filename, target_path};
use crate::process::Edit;
use crate::rule::{Group, Rule};

/// Why an entry cannot be renamed as proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ItemError {
    #[error("Invalid name!")]
    InvalidName,
    #[error("Duplicated name!")]
    Duplicate,
    #[error("Already exists!")]
    TargetExists,
    #[error("Missing replacement!")]
    MissingReplacement,
}

/// Which proposed names are acceptable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// Anything the file system could take, including sub-paths.
    #[default]
    Permissive,
    /// A single path component only; see [`is_valid_filename`].
    Strict,
}

impl NamePolicy {
    pub fn accepts(self, name: &str) -> bool {
        match self {
            NamePolicy::Permissive => {
                !(name.is_empty() || name == "." || name == ".." || name.contains('\0'))
            }
            NamePolicy::Strict => is_valid_filename(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    entry: FileEntry,
    target: Option<String>,
    source_groups: Vec<Group>,
    target_groups: Vec<Group>,
    error: Option<ItemError>,
}

impl PreviewItem {
    pub fn new(entry: FileEntry) -> Self {
        Self {
            entry,
            target: None,
            source_groups: Vec::new(),
            target_groups: Vec::new(),
            error: None,
        }
    }

    /// Recomputes the proposed name with `rule`, clearing any earlier error.
    pub fn evaluate(&mut self, rule: &Rule, policy: NamePolicy) {
        let outcome = rule.rename(self.entry.name());
        self.error = None;
        self.source_groups = outcome.source_groups;
        self.target_groups = outcome.target_groups;
        self.target = (outcome.name != self.entry.name()).then_some(outcome.name);

        if let Some(target) = &self.target {
            if !policy.accepts(target) {
                self.error = Some(ItemError::InvalidName);
            }
        }
    }

    /// Replaces `edit.from..edit.to` of the target with the replacement and
    /// moves the target groups along.
    ///
    /// A group starting at `from` is resized to cover the replacement.
    /// Groups ending after `to` or starting after `from` shift by the
    /// change in length. Returns `false` (and changes nothing) when the
    /// range does not fit the current target.
    pub fn apply_edit(&mut self, edit: &Edit) -> bool {
        let Some(target) = self.target.as_mut() else {
            return false;
        };
        let (from, to) = (edit.from, edit.to);
        if from > to
            || to > target.len()
            || !target.is_char_boundary(from)
            || !target.is_char_boundary(to)
        {
            tracing::warn!(
                "edit {from}..{to} does not fit {:?} for {}",
                target,
                self.entry.path().display()
            );
            return false;
        }

        target.replace_range(from..to, &edit.replacement);
        let diff = edit.replacement.len() as isize - (to - from) as isize;
        let shift = |offset: usize| offset.saturating_add_signed(diff);

        for group in &mut self.target_groups {
            if group.start == from {
                group.end = from + edit.replacement.len();
            } else if group.end > to {
                group.end = shift(group.end);
            }
            if group.start > from {
                group.start = shift(group.start).max(from);
            }
            group.end = floor_char_boundary(target, group.end.min(target.len()));
            group.start = floor_char_boundary(target, group.start.min(group.end));
        }
        true
    }

    pub fn set_error(&mut self, error: ItemError) {
        self.error = Some(error);
    }

    /// Points the item at its entry's new location after a rename.
    pub fn rekey(&mut self, entry: FileEntry) {
        *self = Self::new(entry);
    }

    pub fn entry(&self) -> &FileEntry {
        &self.entry
    }

    pub fn path(&self) -> &Path {
        self.entry.path()
    }

    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// The proposed name; `None` when the rule leaves the name unchanged.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Where the entry would end up.
    pub fn target_path(&self) -> Option<PathBuf> {
        self.target
            .as_deref()
            .map(|target| target_path(self.entry.path(), target))
    }

    pub fn source_groups(&self) -> &[Group] {
        &self.source_groups
    }

    pub fn target_groups(&self) -> &[Group] {
        &self.target_groups
    }

    pub fn error(&self) -> Option<ItemError> {
        self.error
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
