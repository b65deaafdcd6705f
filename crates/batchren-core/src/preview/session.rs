//! The batch under preview.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::item::{ItemError, NamePolicy, PreviewItem};
use crate::event::EntryChange;
use crate::fs::entry::FileEntry;
use crate::fs::ops::rename_entry;
use crate::process::{ProcessItem, ProcessReply, ProcessRequest};
use crate::rule::Rule;

/// How many `$(...)`/`$[...]` substitutions may come out empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementMode {
    /// Empty substitutions are fine.
    MayAllBeMissing,
    /// At least one substitution per entry must produce text.
    NeedAny,
    /// Every substitution must produce text.
    #[default]
    NeedAll,
}

impl ReplacementMode {
    fn is_violated(self, has_empty: bool, all_empty: bool) -> bool {
        match self {
            ReplacementMode::MayAllBeMissing => false,
            ReplacementMode::NeedAny => all_empty,
            ReplacementMode::NeedAll => has_empty,
        }
    }
}

/// Reason reported for entries [`PreviewSession::rename_all`] refuses to
/// touch before the batch has been checked.
pub const UNCHECKED: &str = "Not checked yet!";

/// Outcome of [`PreviewSession::rename_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameSummary {
    /// `(old path, new path)` of every entry renamed.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Entries that could not be renamed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Candidate entries, their proposed names and per-entry errors.
///
/// Entries are kept sorted by name, ignoring case. Every [`evaluate`]
/// call issues a new sequence number; only the [`ProcessReply`] carrying
/// the latest one is applied.
///
/// [`evaluate`]: PreviewSession::evaluate
#[derive(Debug, Default)]
pub struct PreviewSession {
    items: Vec<PreviewItem>,
    index: HashMap<PathBuf, usize>,
    replacement_mode: ReplacementMode,
    name_policy: NamePolicy,
    sequence: u64,
    /// The batch changed since the last evaluation.
    dirty: bool,
    /// The reply to the latest request has been applied.
    checked: bool,
}

impl PreviewSession {
    pub fn new(replacement_mode: ReplacementMode, name_policy: NamePolicy) -> Self {
        Self {
            replacement_mode,
            name_policy,
            ..Default::default()
        }
    }

    /// Adds an entry. Returns `false` if its path is already in the batch.
    pub fn add(&mut self, entry: FileEntry) -> bool {
        if self.index.contains_key(entry.path()) {
            return false;
        }
        let key = sort_key(&entry);
        let position = self
            .items
            .partition_point(|item| sort_key(item.entry()) < key);
        self.items.insert(position, PreviewItem::new(entry));
        self.reindex();
        self.dirty = true;
        true
    }

    pub fn remove(&mut self, path: &Path) -> Option<PreviewItem> {
        let position = self.index.get(path).copied()?;
        let item = self.items.remove(position);
        self.reindex();
        self.dirty = true;
        Some(item)
    }

    /// Applies changes reported by entry discovery, in order. Returns how
    /// many of them changed the batch.
    pub fn apply_changes(&mut self, changes: &[EntryChange]) -> usize {
        changes
            .iter()
            .filter(|change| match change {
                EntryChange::Added(entry) => self.add(entry.clone()),
                EntryChange::Removed(path) => self.remove(path).is_some(),
            })
            .count()
    }

    /// Runs `rule` over the batch and flags invalid and duplicated names.
    ///
    /// Returns the request for the expansion and collision check, or
    /// `None` when some entry already has an error or nothing would be
    /// renamed.
    pub fn evaluate(&mut self, rule: &Rule) -> Option<ProcessRequest> {
        self.sequence += 1;
        self.dirty = false;
        self.checked = false;

        for item in &mut self.items {
            item.evaluate(rule, self.name_policy);
        }
        self.mark_duplicates();

        let errors = self.error_count();
        let items: Vec<ProcessItem> = self
            .items
            .iter()
            .filter_map(|item| {
                item.target().map(|target| ProcessItem {
                    source: item.path().to_path_buf(),
                    target: target.to_string(),
                })
            })
            .collect();
        tracing::debug!(
            "evaluated {} entries: {} to rename, {} errors",
            self.items.len(),
            items.len(),
            errors
        );

        (errors == 0 && !items.is_empty()).then(|| ProcessRequest {
            sequence: self.sequence,
            items,
        })
    }

    /// Flags every entry whose target path another valid entry already
    /// claims. Both sides of a collision are flagged. Returns the number
    /// of entries newly flagged.
    pub fn mark_duplicates(&mut self) -> usize {
        let mut owners: HashMap<PathBuf, usize> = HashMap::new();
        let mut flagged = Vec::new();

        for (position, item) in self.items.iter().enumerate() {
            if !item.is_valid() {
                continue;
            }
            let Some(target) = item.target_path() else {
                continue;
            };
            match owners.get(&target) {
                Some(&first) => {
                    flagged.push(first);
                    flagged.push(position);
                }
                None => {
                    owners.insert(target, position);
                }
            }
        }

        let mut count = 0;
        for position in flagged {
            let item = &mut self.items[position];
            if item.error() != Some(ItemError::Duplicate) {
                item.set_error(ItemError::Duplicate);
                count += 1;
            }
        }
        count
    }

    /// Applies a processor reply.
    ///
    /// Replies to superseded requests are ignored (returns `false`).
    /// Results for entries no longer in the batch are skipped.
    pub fn apply_reply(&mut self, reply: ProcessReply) -> bool {
        if reply.sequence != self.sequence {
            tracing::debug!(
                "discarding reply {} (latest is {})",
                reply.sequence,
                self.sequence
            );
            return false;
        }

        for result in reply.results {
            let Some(&position) = self.index.get(&result.source) else {
                tracing::debug!("{} left the batch", result.source.display());
                continue;
            };
            let item = &mut self.items[position];

            if self
                .replacement_mode
                .is_violated(result.has_empty, result.all_empty)
            {
                item.set_error(ItemError::MissingReplacement);
            } else if result.exists {
                item.set_error(ItemError::TargetExists);
            }

            for edit in &result.edits {
                if !item.apply_edit(edit) {
                    break;
                }
            }

            let accepted = item.target().map(|t| self.name_policy.accepts(t));
            if item.is_valid() && accepted == Some(false) {
                item.set_error(ItemError::InvalidName);
            }
        }

        self.mark_duplicates();
        self.checked = true;
        true
    }

    /// Drops entries the current rule leaves unchanged. Returns how many.
    pub fn remove_unchanged(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(PreviewItem::has_target);
        self.reindex();
        before - self.items.len()
    }

    pub fn has_unchanged(&self) -> bool {
        self.items.iter().any(|item| !item.has_target())
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.has_target() && !item.is_valid())
            .count()
    }

    /// Number of entries with a proposed name.
    pub fn target_count(&self) -> usize {
        self.items.iter().filter(|item| item.has_target()).count()
    }

    /// `true` once the latest check came back clean and there is
    /// something to rename.
    pub fn is_ready(&self) -> bool {
        !self.dirty && self.checked && self.error_count() == 0 && self.target_count() > 0
    }

    /// Renames every entry that has a valid target.
    ///
    /// Failures are logged and collected; the rest of the batch carries on.
    /// Renamed entries stay in the batch under their new path.
    ///
    /// Nothing is renamed unless the reply to the latest evaluation has been
    /// applied, since targets may still hold unexpanded `$(...)`/`$[...]`
    /// text. Every entry with a target is then reported as failed.
    pub fn rename_all(&mut self) -> RenameSummary {
        let mut summary = RenameSummary::default();
        let checked = !self.dirty && self.checked;
        if !checked {
            tracing::warn!("batch has not been checked since it last changed; nothing renamed");
        }

        for item in &mut self.items {
            let Some(target) = item.target().map(str::to_string) else {
                continue;
            };
            let source = item.path().to_path_buf();
            if let Some(error) = item.error() {
                summary.failed.push((source, error.to_string()));
                continue;
            }
            if !checked {
                summary.failed.push((source, UNCHECKED.to_string()));
                continue;
            }

            let renamed = rename_entry(&source, &target)
                .and_then(|new_path| FileEntry::from_path(&new_path));
            match renamed {
                Ok(entry) => {
                    tracing::debug!("renamed {} to {}", source.display(), entry.path().display());
                    summary.renamed.push((source, entry.path().to_path_buf()));
                    item.rekey(entry);
                }
                Err(e) => {
                    tracing::warn!("renaming {} failed: {e}", source.display());
                    summary.failed.push((source, e.to_string()));
                }
            }
        }

        if summary.renamed.is_empty() {
            return summary;
        }

        self.items
            .sort_by(|a, b| sort_key(a.entry()).cmp(&sort_key(b.entry())));
        self.reindex();
        self.dirty = true;
        self.checked = false;
        summary
    }

    pub fn items(&self) -> &[PreviewItem] {
        &self.items
    }

    pub fn get(&self, path: &Path) -> Option<&PreviewItem> {
        self.index.get(path).map(|&position| &self.items[position])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sequence number of the latest request.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn replacement_mode(&self) -> ReplacementMode {
        self.replacement_mode
    }

    pub fn set_replacement_mode(&mut self, mode: ReplacementMode) {
        self.replacement_mode = mode;
        self.dirty = true;
    }

    pub fn name_policy(&self) -> NamePolicy {
        self.name_policy
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.path().to_path_buf(), position))
            .collect();
    }
}

fn sort_key(entry: &FileEntry) -> (String, &Path) {
    (entry.name().to_lowercase(), entry.path())
}
