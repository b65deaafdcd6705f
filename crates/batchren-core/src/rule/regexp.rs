//! Regular-expression rename rule.
//!
//! The first match in the name is used. When the pattern captured something
//! in group 1, the new name is built purely from the replacement template,
//! with `\0`..`\9` resolved to the captured text. Without captures the
//! replacement only stands in for the matched text; the rest of the name is
//! kept around it.

use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::{split_extension, Group, RenameOutcome, MAX_NAME_LENGTH};

/// Settings for [`RegexRule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexConfig {
    pub pattern: String,
    pub replace: String,
    pub case_insensitive: bool,
    /// Match only the part before the last `.` and keep the extension as is.
    pub ignore_extension: bool,
}

/// Compiled regular-expression rule.
///
/// An invalid or empty pattern produces a rule that never matches.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Option<Regex>,
    replace: String,
    ignore_extension: bool,
}

impl RegexRule {
    pub fn new(config: &RegexConfig) -> Self {
        let regex = if config.pattern.is_empty() {
            None
        } else {
            match RegexBuilder::new(&config.pattern)
                .case_insensitive(config.case_insensitive)
                .build()
            {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("invalid rename pattern {:?}: {e}", config.pattern);
                    None
                }
            }
        };

        Self {
            regex,
            replace: config.replace.clone(),
            ignore_extension: config.ignore_extension,
        }
    }

    /// Returns `true` if the pattern compiled.
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    pub fn rename(&self, name: &str) -> RenameOutcome {
        let Some(regex) = &self.regex else {
            return RenameOutcome::unchanged(name);
        };

        let (text, extension) = split_extension(name, self.ignore_extension);
        let Some(captures) = regex.captures(text) else {
            return RenameOutcome::unchanged(name);
        };
        let Some(whole) = captures.get(0) else {
            return RenameOutcome::unchanged(name);
        };

        // Only the matched text is replaced when group 1 did not take part.
        let in_place = captures.get(1).is_none();

        // Captures are highlighted up to the first one that did not take part.
        let mut source_groups: Vec<Group> = if in_place {
            vec![Group::new(0, whole.start(), whole.end())]
        } else {
            (1..captures.len())
                .map_while(|index| {
                    captures
                        .get(index)
                        .map(|m| Group::new(index as u32, m.start(), m.end()))
                })
                .collect()
        };
        source_groups.sort_by_key(|group| group.start);

        let mut output = String::with_capacity(name.len() + self.replace.len());
        if in_place {
            output.push_str(&text[..whole.start()]);
        }
        let replacement_start = output.len();
        let mut target_groups = expand_template(&self.replace, &captures, &mut output);

        if in_place {
            target_groups.insert(0, Group::new(0, replacement_start, output.len()));
            output.push_str(&text[whole.end()..]);
        }
        output.push_str(extension);

        RenameOutcome {
            name: output,
            source_groups,
            target_groups,
        }
    }
}

/// Appends `template` to `output`, resolving `\N` backreferences.
///
/// Each resolved backreference becomes one target group. Expansion stops
/// once the output would exceed [`MAX_NAME_LENGTH`]; the rest of the
/// template is then copied as is.
fn expand_template(template: &str, captures: &Captures<'_>, output: &mut String) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut rest = template;

    while let Some(position) = rest.find('\\') {
        let digit = rest[position + 1..]
            .chars()
            .next()
            .and_then(|c| c.to_digit(10));
        let Some(index) = digit else {
            output.push_str(&rest[..=position]);
            rest = &rest[position + 1..];
            continue;
        };

        let value = captures.get(index as usize);
        let length = value.map_or(0, |m| m.len());
        if output.len() + position + length > MAX_NAME_LENGTH {
            break;
        }

        output.push_str(&rest[..position]);
        if let Some(value) = value {
            let start = output.len();
            output.push_str(value.as_str());
            groups.push(Group::new(index, start, output.len()));
        }
        rest = &rest[position + 2..];
    }

    output.push_str(rest);
    groups
}
