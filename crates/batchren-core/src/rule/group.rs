//! Highlight ranges reported by rename rules.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A labelled, half-open byte range `[start, end)` within a name.
///
/// Ranges sharing an `index` belong together (the same regex capture, the
/// same run of invalid characters) and are rendered as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub index: u32,
    pub start: usize,
    pub end: usize,
}

impl Group {
    pub fn new(index: u32, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "group range {start}..{end} is inverted");
        Self { index, start, end }
    }

    /// Length of the range in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Appends a range to `groups`, extending the last group instead when the new
/// range starts exactly where it ended.
///
/// Returns `true` if a new group was opened.
pub fn push_group(groups: &mut Vec<Group>, index: u32, start: usize, end: usize) -> bool {
    if let Some(last) = groups.last_mut() {
        if last.end == start {
            last.end = end;
            return false;
        }
    }
    groups.push(Group::new(index, start, end));
    true
}
