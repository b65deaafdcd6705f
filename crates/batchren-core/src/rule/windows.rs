//! Makes names safe for Windows file systems.
//!
//! Control characters and `"*:<>?\/|` are replaced, and trailing spaces and
//! dots are trimmed (Windows silently drops them).

use serde::{Deserialize, Serialize};

use super::group::push_group;
use super::{Group, RenameOutcome};

const INVALID_CHARS: &str = "\"*:<>?\\/|";
const FALLBACK_REPLACEMENT: &str = "_";

/// Returns `true` for characters Windows does not allow in file names.
pub fn is_invalid_char(c: char) -> bool {
    (c as u32) <= 0x1F || INVALID_CHARS.contains(c)
}

/// Settings for [`WindowsRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsConfig {
    /// Text put in place of each invalid character. Empty deletes them.
    pub replace: String,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            replace: FALLBACK_REPLACEMENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowsRule {
    replacement: String,
}

impl WindowsRule {
    pub fn new(config: &WindowsConfig) -> Self {
        Self::with_string(&config.replace)
    }

    /// Uses `replacement` with any invalid characters removed from it.
    ///
    /// An empty string deletes invalid characters; a string made only of
    /// invalid characters falls back to `_`.
    pub fn with_string(replacement: &str) -> Self {
        if replacement.is_empty() {
            return Self {
                replacement: String::new(),
            };
        }
        let filtered: String = replacement.chars().filter(|&c| !is_invalid_char(c)).collect();
        Self {
            replacement: if filtered.is_empty() {
                FALLBACK_REPLACEMENT.to_string()
            } else {
                filtered
            },
        }
    }

    /// Single-character form: `None` deletes invalid characters.
    pub fn with_char(replacement: Option<char>) -> Self {
        let replacement = match replacement {
            None => String::new(),
            Some(c) if is_invalid_char(c) => FALLBACK_REPLACEMENT.to_string(),
            Some(c) => c.to_string(),
        };
        Self { replacement }
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn rename(&self, name: &str) -> RenameOutcome {
        let mut output = String::with_capacity(name.len());
        let mut source_groups = Vec::new();
        let mut target_groups = Vec::new();
        let mut next_source = 1;
        let mut next_target = 1;
        // Output offset at which each source character starts.
        let mut placed: Vec<(usize, usize)> = Vec::with_capacity(name.len());

        for (offset, c) in name.char_indices() {
            placed.push((offset, output.len()));
            if !is_invalid_char(c) {
                output.push(c);
                continue;
            }

            if push_group(&mut source_groups, next_source, offset, offset + c.len_utf8()) {
                next_source += 1;
            }
            if !self.replacement.is_empty() {
                let start = output.len();
                output.push_str(&self.replacement);
                if push_group(&mut target_groups, next_target, start, output.len()) {
                    next_target += 1;
                }
            }
        }

        let kept = trimmed_len(&output);
        if kept < output.len() {
            let source_start = placed
                .iter()
                .find(|&&(_, placed_at)| placed_at >= kept)
                .map_or(name.len(), |&(offset, _)| offset);

            source_groups.retain_mut(|group| {
                group.end = group.end.min(source_start);
                group.start < group.end
            });
            // Nothing to mark when only replacement text was trimmed.
            if source_start < name.len() {
                source_groups.push(Group::new(next_source, source_start, name.len()));
            }

            target_groups.retain_mut(|group| {
                group.end = group.end.min(kept);
                group.start < group.end
            });
            output.truncate(kept);
        }

        source_groups.sort_by_key(|group: &Group| group.start);

        RenameOutcome {
            name: output,
            source_groups,
            target_groups,
        }
    }
}

/// Length of `name` without trailing spaces and dots, keeping at least the
/// first character.
fn trimmed_len(name: &str) -> usize {
    let kept = name.trim_end_matches([' ', '.']).len();
    if kept > 0 {
        return kept;
    }
    name.chars().next().map_or(0, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_chars() {
        for c in ['"', '*', ':', '<', '>', '?', '\\', '/', '|', '\0', '\n', '\u{1f}'] {
            assert!(is_invalid_char(c), "{c:?}");
        }
        for c in ['a', ' ', '.', '-', 'é', '日', '\u{7f}'] {
            assert!(!is_invalid_char(c), "{c:?}");
        }
    }

    #[test]
    fn replaces_each_invalid_char() {
        let outcome = WindowsRule::new(&WindowsConfig::default()).rename("a:b*c.txt");
        assert_eq!(outcome.name, "a_b_c.txt");
        assert_eq!(
            outcome.source_groups,
            vec![Group::new(1, 1, 2), Group::new(2, 3, 4)]
        );
        assert_eq!(
            outcome.target_groups,
            vec![Group::new(1, 1, 2), Group::new(2, 3, 4)]
        );
    }

    #[test]
    fn adjacent_invalid_chars_form_one_group() {
        let outcome = WindowsRule::with_char(Some('-')).rename("a<>b");
        assert_eq!(outcome.name, "a--b");
        assert_eq!(outcome.source_groups, vec![Group::new(1, 1, 3)]);
        assert_eq!(outcome.target_groups, vec![Group::new(1, 1, 3)]);
    }

    #[test]
    fn trims_trailing_spaces_and_dots() {
        let outcome = WindowsRule::new(&WindowsConfig::default()).rename("name.  ");
        assert_eq!(outcome.name, "name");
        assert_eq!(outcome.source_groups, vec![Group::new(1, 4, 7)]);
        assert!(outcome.target_groups.is_empty());
    }

    #[test]
    fn trimming_keeps_first_char() {
        let outcome = WindowsRule::new(&WindowsConfig::default()).rename("...");
        assert_eq!(outcome.name, ".");
        assert_eq!(outcome.source_groups, vec![Group::new(1, 1, 3)]);
    }

    #[test]
    fn trimming_follows_replacement() {
        let outcome = WindowsRule::new(&WindowsConfig::default()).rename("what? .");
        assert_eq!(outcome.name, "what_");
        assert_eq!(
            outcome.source_groups,
            vec![Group::new(1, 4, 5), Group::new(2, 5, 7)]
        );
        assert_eq!(outcome.target_groups, vec![Group::new(1, 4, 5)]);
    }

    #[test]
    fn empty_replacement_deletes() {
        let rule = WindowsRule::with_string("");
        assert_eq!(rule.replacement(), "");
        let outcome = rule.rename("a:b|c");
        assert_eq!(outcome.name, "abc");
        assert_eq!(
            outcome.source_groups,
            vec![Group::new(1, 1, 2), Group::new(2, 3, 4)]
        );
        assert!(outcome.target_groups.is_empty());
    }

    #[test]
    fn with_char_none_deletes() {
        let outcome = WindowsRule::with_char(None).rename("x?y");
        assert_eq!(outcome.name, "xy");
    }

    #[test]
    fn invalid_replacement_char_falls_back() {
        assert_eq!(WindowsRule::with_char(Some('*')).replacement(), "_");
        assert_eq!(WindowsRule::with_string(":|").replacement(), "_");
        assert_eq!(WindowsRule::with_string("a:b").replacement(), "ab");
    }

    #[test]
    fn multi_char_replacement() {
        let outcome = WindowsRule::with_string(" - ").rename("a:b");
        assert_eq!(outcome.name, "a - b");
        assert_eq!(outcome.source_groups, vec![Group::new(1, 1, 2)]);
        assert_eq!(outcome.target_groups, vec![Group::new(1, 1, 4)]);
    }

    #[test]
    fn multibyte_names_keep_boundaries() {
        let outcome = WindowsRule::new(&WindowsConfig::default()).rename("日本:語.txt");
        assert_eq!(outcome.name, "日本_語.txt");
        assert_eq!(outcome.source_groups, vec![Group::new(1, 6, 7)]);
        assert_eq!(outcome.target_groups, vec![Group::new(1, 6, 7)]);
    }

    #[test]
    fn trimmed_replacement_text_adds_no_source_group() {
        let outcome = WindowsRule::with_string("x.").rename("a:");
        assert_eq!(outcome.name, "ax");
        assert_eq!(outcome.source_groups, vec![Group::new(1, 1, 2)]);
        assert_eq!(outcome.target_groups, vec![Group::new(1, 1, 2)]);
        assert!(outcome.source_groups.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn valid_name_is_unchanged() {
        let outcome = WindowsRule::new(&WindowsConfig::default()).rename("report 2024.pdf");
        assert!(outcome.is_unchanged());
        assert_eq!(outcome.name, "report 2024.pdf");
    }

    #[test]
    fn config_default_replacement() {
        assert_eq!(WindowsConfig::default().replace, "_");
    }
}
