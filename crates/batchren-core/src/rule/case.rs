//! Case conversion rule.

use serde::{Deserialize, Serialize};

use super::{suffix_index, Group, RenameOutcome, MAX_NAME_LENGTH};

/// How letters in the name are converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// First letter of every run of letters upper-cased.
    #[default]
    Title,
    Upper,
    Lower,
}

/// How letters in the extension (after the last `.`) are converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionCase {
    #[default]
    Lower,
    Upper,
    Unchanged,
    /// Use the same [`CaseMode`] as the rest of the name.
    SameAsName,
}

/// Settings for [`CaseRule`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseConfig {
    pub mode: CaseMode,
    pub extension: ExtensionCase,
    /// In title case, also lower-case every letter after the first of a run.
    pub force: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CaseRule {
    config: CaseConfig,
}

impl CaseRule {
    pub fn new(config: &CaseConfig) -> Self {
        Self { config: *config }
    }

    pub fn rename(&self, name: &str) -> RenameOutcome {
        let extension_start = suffix_index(name).map(|index| index + 1);
        let mut mode = Some(self.config.mode);

        let mut output = String::with_capacity(name.len());
        let mut source_groups = Vec::new();
        let mut target_groups = Vec::new();
        let mut group_index = 0;
        // (source offset, output offset) where the current run of changes began
        let mut open: Option<(usize, usize)> = None;
        let mut in_word = false;
        let mut consumed = 0;

        for (offset, c) in name.char_indices() {
            if Some(offset) == extension_start {
                mode = match self.config.extension {
                    ExtensionCase::Lower => Some(CaseMode::Lower),
                    ExtensionCase::Upper => Some(CaseMode::Upper),
                    ExtensionCase::Unchanged => None,
                    ExtensionCase::SameAsName => mode,
                };
            }

            let converted = self.convert(c, mode, &mut in_word);
            let changed = converted.len() != c.len_utf8() || !converted.starts_with(c);

            if output.len() + converted.len() > MAX_NAME_LENGTH {
                break;
            }

            match (changed, open) {
                (true, None) => open = Some((offset, output.len())),
                (false, Some((source_start, target_start))) => {
                    source_groups.push(Group::new(group_index, source_start, offset));
                    target_groups.push(Group::new(group_index, target_start, output.len()));
                    group_index += 1;
                    open = None;
                }
                _ => {}
            }

            output.push_str(&converted);
            consumed = offset + c.len_utf8();
        }

        if let Some((source_start, target_start)) = open {
            source_groups.push(Group::new(group_index, source_start, consumed));
            target_groups.push(Group::new(group_index, target_start, output.len()));
        }

        RenameOutcome {
            name: output,
            source_groups,
            target_groups,
        }
    }

    fn convert(&self, c: char, mode: Option<CaseMode>, in_word: &mut bool) -> String {
        let Some(mode) = mode else {
            return c.to_string();
        };
        if !c.is_alphabetic() {
            *in_word = false;
            return c.to_string();
        }

        match mode {
            CaseMode::Title if !*in_word => {
                *in_word = true;
                c.to_uppercase().collect()
            }
            CaseMode::Title if self.config.force => c.to_lowercase().collect(),
            CaseMode::Title => c.to_string(),
            CaseMode::Upper => c.to_uppercase().collect(),
            CaseMode::Lower => c.to_lowercase().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(mode: CaseMode, extension: ExtensionCase, force: bool) -> CaseRule {
        CaseRule::new(&CaseConfig {
            mode,
            extension,
            force,
        })
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        let outcome = rule(CaseMode::Title, ExtensionCase::Lower, false).rename("hello wORLD.TXT");
        assert_eq!(outcome.name, "Hello WORLD.txt");
        assert_eq!(
            outcome.source_groups,
            vec![
                Group::new(0, 0, 1),
                Group::new(1, 6, 7),
                Group::new(2, 12, 15)
            ]
        );
        assert_eq!(outcome.target_groups, outcome.source_groups);
    }

    #[test]
    fn forced_title_case_lowers_rest_of_word() {
        let outcome = rule(CaseMode::Title, ExtensionCase::Unchanged, true).rename("hello wORLD.TXT");
        assert_eq!(outcome.name, "Hello World.TXT");
        assert_eq!(
            outcome.source_groups,
            vec![Group::new(0, 0, 1), Group::new(1, 6, 11)]
        );
    }

    #[test]
    fn digits_and_punctuation_split_words() {
        let outcome = rule(CaseMode::Title, ExtensionCase::Unchanged, false).rename("abc1def-ghi");
        assert_eq!(outcome.name, "Abc1Def-Ghi");
    }

    #[test]
    fn upper_case_with_same_extension_mode() {
        let outcome = rule(CaseMode::Upper, ExtensionCase::SameAsName, false).rename("report.pdf");
        assert_eq!(outcome.name, "REPORT.PDF");
        assert_eq!(
            outcome.source_groups,
            vec![Group::new(0, 0, 6), Group::new(1, 7, 10)]
        );
    }

    #[test]
    fn lower_case_with_upper_extension() {
        let outcome = rule(CaseMode::Lower, ExtensionCase::Upper, false).rename("README.md");
        assert_eq!(outcome.name, "readme.MD");
    }

    #[test]
    fn name_without_extension_uses_body_mode_throughout() {
        let outcome = rule(CaseMode::Upper, ExtensionCase::Lower, false).rename("makefile");
        assert_eq!(outcome.name, "MAKEFILE");
        assert_eq!(outcome.source_groups, vec![Group::new(0, 0, 8)]);
    }

    #[test]
    fn hidden_file_name_is_not_an_extension() {
        let outcome = rule(CaseMode::Upper, ExtensionCase::Unchanged, false).rename(".bashrc");
        assert_eq!(outcome.name, ".BASHRC");
    }

    #[test]
    fn unchanged_name_has_no_groups() {
        let outcome = rule(CaseMode::Lower, ExtensionCase::Lower, false).rename("already.txt");
        assert_eq!(outcome.name, "already.txt");
        assert!(outcome.source_groups.is_empty());
        assert!(outcome.target_groups.is_empty());
    }

    #[test]
    fn multibyte_letters_keep_char_boundaries() {
        let outcome = rule(CaseMode::Upper, ExtensionCase::Lower, false).rename("café.txt");
        assert_eq!(outcome.name, "CAFÉ.txt");
        assert_eq!(outcome.source_groups, vec![Group::new(0, 0, 5)]);
        assert_eq!(outcome.target_groups, vec![Group::new(0, 0, 5)]);
        for group in &outcome.source_groups {
            assert!("café.txt".is_char_boundary(group.start));
            assert!("café.txt".is_char_boundary(group.end));
        }
    }

    #[test]
    fn cjk_has_no_case() {
        let outcome = rule(CaseMode::Upper, ExtensionCase::Upper, false).rename("日本語.txt");
        assert_eq!(outcome.name, "日本語.TXT");
        assert_eq!(outcome.source_groups, vec![Group::new(0, 10, 13)]);
    }

    #[test]
    fn expanding_conversion_tracks_target_offsets() {
        let outcome = rule(CaseMode::Upper, ExtensionCase::Unchanged, false).rename("straße x");
        assert_eq!(outcome.name, "STRASSE X");
        assert_eq!(outcome.source_groups, vec![Group::new(0, 0, 7), Group::new(1, 8, 9)]);
        assert_eq!(outcome.target_groups, vec![Group::new(0, 0, 7), Group::new(1, 8, 9)]);
    }

    #[test]
    fn output_is_bounded() {
        let name = "ß".repeat(600);
        let outcome = rule(CaseMode::Upper, ExtensionCase::Unchanged, false).rename(&name);
        assert!(outcome.name.len() <= MAX_NAME_LENGTH);
        assert_eq!(outcome.source_groups.len(), 1);
        let group = outcome.source_groups[0];
        assert!(name.is_char_boundary(group.end));
        assert_eq!(outcome.target_groups[0].end, outcome.name.len());
    }
}
