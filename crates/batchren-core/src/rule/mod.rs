//! Rename rules.
//!
//! Each rule computes a new name from an old one and reports which byte
//! ranges changed on both sides ([`Group`]s). Rules are pure: the same
//! configuration and input always yield the same [`RenameOutcome`], so the
//! whole batch can be re-evaluated on every edit of the rule settings.
//!
//! - [`search`] — glob-style search & replace (`*`, `?`).
//! - [`regexp`] — regular expressions with `\1`..`\9` backreferences.
//! - [`case`] — title / upper / lower case conversion.
//! - [`windows`] — replaces characters Windows does not allow in file names.

pub mod case;
pub mod group;
pub mod regexp;
pub mod search;
pub mod windows;

use serde::{Deserialize, Serialize};

pub use case::{CaseConfig, CaseMode, CaseRule, ExtensionCase};
pub use group::{push_group, Group};
pub use regexp::{RegexConfig, RegexRule};
pub use search::{SearchReplaceConfig, SearchReplaceRule};
pub use windows::{is_invalid_char, WindowsConfig, WindowsRule};

/// Upper bound, in bytes, for names produced by rules that can grow their input.
pub const MAX_NAME_LENGTH: usize = 256;

/// Returns the byte index of the extension separator (the last `.`).
///
/// A leading dot (`.bashrc`) marks a hidden file rather than an extension,
/// so `None` is returned for it.
pub fn suffix_index(name: &str) -> Option<usize> {
    name.rfind('.').filter(|&index| index > 0)
}

/// Splits `name` into the searchable part and the extension (including the
/// dot) when `ignore_extension` is set.
pub(crate) fn split_extension(name: &str, ignore_extension: bool) -> (&str, &str) {
    match suffix_index(name) {
        Some(index) if ignore_extension => name.split_at(index),
        _ => (name, ""),
    }
}

/// The result of applying a rule to one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    /// The produced name. Equal to the input when nothing applied.
    pub name: String,
    /// Ranges in the original name that matched or changed.
    pub source_groups: Vec<Group>,
    /// Ranges in the produced name holding replacement text.
    pub target_groups: Vec<Group>,
}

impl RenameOutcome {
    /// The canonical "nothing to do" result.
    pub fn unchanged(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source_groups: Vec::new(),
            target_groups: Vec::new(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.source_groups.is_empty() && self.target_groups.is_empty()
    }
}

/// One configured rename rule.
#[derive(Debug, Clone)]
pub enum Rule {
    SearchReplace(SearchReplaceRule),
    Regex(RegexRule),
    Case(CaseRule),
    Windows(WindowsRule),
}

impl Rule {
    /// Applies the rule to `name`.
    ///
    /// When the produced name equals the input both group lists are empty,
    /// whatever the individual rule reported.
    pub fn rename(&self, name: &str) -> RenameOutcome {
        let outcome = match self {
            Rule::SearchReplace(rule) => rule.rename(name),
            Rule::Regex(rule) => rule.rename(name),
            Rule::Case(rule) => rule.rename(name),
            Rule::Windows(rule) => rule.rename(name),
        };
        if outcome.name == name {
            RenameOutcome::unchanged(name)
        } else {
            outcome
        }
    }
}

/// Serializable rule settings, tagged by `method`.
///
/// ```toml
/// method = "regex"
/// pattern = "([0-9]+)-([0-9]+)"
/// replace = "\\2-\\1"
/// ignore_extension = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum RuleConfig {
    Search(SearchReplaceConfig),
    Regex(RegexConfig),
    Case(CaseConfig),
    Windows(WindowsConfig),
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig::Search(SearchReplaceConfig::default())
    }
}

impl RuleConfig {
    /// Builds the rule. Never fails: a pattern that does not compile yields
    /// a rule that leaves every name unchanged.
    pub fn build(&self) -> Rule {
        match self {
            RuleConfig::Search(config) => Rule::SearchReplace(SearchReplaceRule::new(config)),
            RuleConfig::Regex(config) => Rule::Regex(RegexRule::new(config)),
            RuleConfig::Case(config) => Rule::Case(CaseRule::new(config)),
            RuleConfig::Windows(config) => Rule::Windows(WindowsRule::new(config)),
        }
    }
}
