//! Preview and result reports.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use batchren_core::{Group, ItemError, PreviewItem, PreviewSession, RenameSummary};
use crossterm::style::{Color, Stylize};
use serde::Serialize;

/// Background colours cycled through by group index.
const GROUP_COLORS: [Color; 5] = [
    Color::DarkBlue,
    Color::DarkGreen,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::DarkYellow,
];

/// Everything printed for one run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub items: Vec<ItemReport>,
    pub errors: usize,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RenameSummary>,
}

#[derive(Debug, Serialize)]
pub struct ItemReport {
    pub source: PathBuf,
    pub name: String,
    /// Symlinks are renamed themselves, never their targets.
    pub is_symlink: bool,
    pub target: Option<String>,
    pub source_groups: Vec<Group>,
    pub target_groups: Vec<Group>,
    pub error: Option<ItemError>,
}

impl From<&PreviewItem> for ItemReport {
    fn from(item: &PreviewItem) -> Self {
        Self {
            source: item.path().to_path_buf(),
            name: item.name().to_string(),
            is_symlink: item.entry().is_symlink(),
            target: item.target().map(str::to_string),
            source_groups: item.source_groups().to_vec(),
            target_groups: item.target_groups().to_vec(),
            error: item.error(),
        }
    }
}

impl Report {
    pub fn from_session(session: &PreviewSession) -> Self {
        Self {
            items: session.items().iter().map(ItemReport::from).collect(),
            errors: session.error_count(),
            ready: session.is_ready(),
            summary: None,
        }
    }

    /// Writes the human-readable report.
    pub fn write_text(&self, out: &mut impl Write, color: bool) -> io::Result<()> {
        for item in &self.items {
            let prefix = directory_prefix(&item.source);
            let source = highlight(&item.name, &item.source_groups, color);
            // Marked like `ls -F`.
            let source = if item.is_symlink {
                format!("{source}@")
            } else {
                source
            };
            match &item.target {
                Some(target) => {
                    let target = highlight(target, &item.target_groups, color);
                    write!(out, "{prefix}{source} -> {target}")?;
                }
                None => write!(out, "{prefix}{source} (unchanged)")?,
            }
            if let Some(error) = item.error {
                let message = error.to_string();
                if color {
                    write!(out, "  {}", message.red())?;
                } else {
                    write!(out, "  {message}")?;
                }
            }
            writeln!(out)?;
        }

        let to_rename = self.items.iter().filter(|i| i.target.is_some()).count();
        writeln!(out)?;
        writeln!(
            out,
            "{} entries, {} to rename, {} errors",
            self.items.len(),
            to_rename,
            self.errors
        )?;

        if let Some(summary) = &self.summary {
            for (from, to) in &summary.renamed {
                writeln!(out, "renamed {} -> {}", from.display(), to.display())?;
            }
            for (path, reason) in &summary.failed {
                writeln!(out, "failed {}: {reason}", path.display())?;
            }
        }
        Ok(())
    }
}

fn directory_prefix(path: &Path) -> String {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => format!("{}/", parent.display()),
        _ => String::new(),
    }
}

/// Marks the groups of `name`: a background colour per group index, or
/// `[...]` brackets without colour.
///
/// Groups that overlap an earlier one or do not fall on character
/// boundaries are left unmarked.
pub fn highlight(name: &str, groups: &[Group], color: bool) -> String {
    let mut sorted: Vec<Group> = groups
        .iter()
        .copied()
        .filter(|g| {
            !g.is_empty()
                && g.end <= name.len()
                && name.is_char_boundary(g.start)
                && name.is_char_boundary(g.end)
        })
        .collect();
    sorted.sort_by_key(|g| g.start);

    let mut out = String::with_capacity(name.len() + sorted.len() * 12);
    let mut cursor = 0;
    for group in sorted {
        if group.start < cursor {
            continue;
        }
        out.push_str(&name[cursor..group.start]);
        let text = &name[group.range()];
        if color {
            let background = GROUP_COLORS[group.index as usize % GROUP_COLORS.len()];
            out.push_str(&text.with(Color::White).on(background).to_string());
        } else {
            out.push('[');
            out.push_str(text);
            out.push(']');
        }
        cursor = group.end;
    }
    out.push_str(&name[cursor..]);
    out
}
