//! Glob-style search & replace.
//!
//! The pattern is literal text plus two wildcards: `?` matches exactly one
//! character and `*` matches any run of characters. A trailing `*` swallows
//! everything up to the end of the searched region; a `*` followed by more
//! pattern stretches only as far as needed for the rest to match. Only the
//! first (leftmost) match is replaced.

use serde::{Deserialize, Serialize};

use super::group::push_group;
use super::{split_extension, RenameOutcome};

/// Settings for [`SearchReplaceRule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchReplaceConfig {
    pub pattern: String,
    pub replace: String,
    pub case_insensitive: bool,
    /// Search only the part before the last `.` and keep the extension as is.
    pub ignore_extension: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    AnyRun,
}

/// Compiled search & replace rule.
#[derive(Debug, Clone)]
pub struct SearchReplaceRule {
    tokens: Vec<Token>,
    replace: String,
    case_insensitive: bool,
    ignore_extension: bool,
}

impl SearchReplaceRule {
    pub fn new(config: &SearchReplaceConfig) -> Self {
        let mut tokens = Vec::with_capacity(config.pattern.len());
        for c in config.pattern.chars() {
            let token = match c {
                '*' => Token::AnyRun,
                '?' => Token::AnyChar,
                c => Token::Literal(c),
            };
            // Consecutive stars are a single run.
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }

        Self {
            tokens,
            replace: config.replace.clone(),
            case_insensitive: config.case_insensitive,
            ignore_extension: config.ignore_extension,
        }
    }

    pub fn rename(&self, name: &str) -> RenameOutcome {
        if self.tokens.is_empty() {
            return RenameOutcome::unchanged(name);
        }

        // With the extension left out, a dot file has nothing left to search.
        if self.ignore_extension && name.rfind('.') == Some(0) {
            return RenameOutcome::unchanged(name);
        }

        let (region, extension) = split_extension(name, self.ignore_extension);
        let chars: Vec<(usize, char)> = region.char_indices().collect();
        let byte_at = |index: usize| chars.get(index).map_or(region.len(), |&(offset, _)| offset);

        let Some((first, last)) = (0..=chars.len())
            .find_map(|start| self.match_at(&chars, start).map(|end| (start, end)))
        else {
            return RenameOutcome::unchanged(name);
        };

        let (start, end) = (byte_at(first), byte_at(last));
        let mut source_groups = Vec::new();
        let mut target_groups = Vec::new();
        let mut output = String::with_capacity(name.len() + self.replace.len());

        output.push_str(&region[..start]);
        push_group(&mut source_groups, 0, start, end);
        if !self.replace.is_empty() {
            push_group(
                &mut target_groups,
                0,
                output.len(),
                output.len() + self.replace.len(),
            );
            output.push_str(&self.replace);
        }
        output.push_str(&region[end..]);
        output.push_str(extension);

        RenameOutcome {
            name: output,
            source_groups,
            target_groups,
        }
    }

    /// Tries to match the whole pattern starting at character `start`.
    ///
    /// Returns the character index one past the match. Empty matches are
    /// rejected.
    fn match_at(&self, chars: &[(usize, char)], start: usize) -> Option<usize> {
        let mut token = 0;
        let mut cursor = start;
        // Resume point of the innermost `*`: (token after it, next char it may swallow).
        let mut backtrack: Option<(usize, usize)> = None;

        loop {
            if token == self.tokens.len() {
                return (cursor > start).then_some(cursor);
            }

            match self.tokens[token] {
                Token::AnyRun if token + 1 == self.tokens.len() => {
                    return (chars.len() > start).then_some(chars.len());
                }
                Token::AnyRun => {
                    token += 1;
                    backtrack = Some((token, cursor));
                    continue;
                }
                Token::AnyChar if cursor < chars.len() => {
                    token += 1;
                    cursor += 1;
                    continue;
                }
                Token::Literal(expected)
                    if cursor < chars.len() && self.same_char(chars[cursor].1, expected) =>
                {
                    token += 1;
                    cursor += 1;
                    continue;
                }
                _ => {}
            }

            match backtrack {
                Some((resume, swallowed)) if swallowed < chars.len() => {
                    backtrack = Some((resume, swallowed + 1));
                    token = resume;
                    cursor = swallowed + 1;
                }
                _ => return None,
            }
        }
    }

    fn same_char(&self, value: char, expected: char) -> bool {
        if value == expected {
            return true;
        }
        self.case_insensitive && value.to_lowercase().eq(expected.to_lowercase())
    }
}
