//! Command-line arguments.

use std::path::PathBuf;

use batchren_core::rule::{
    CaseConfig, CaseMode, ExtensionCase, RegexConfig, SearchReplaceConfig, WindowsConfig,
};
use batchren_core::{FileTypeMode, GeneralSettings, NamePolicy, ReplacementMode, RuleConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "batchren")]
#[command(version)]
#[command(about = "Preview and apply batch renames")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: ~/.config/batchren/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replace the first match of a glob-style pattern (`*`, `?`)
    Search {
        #[command(flatten)]
        rule: SearchArgs,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Rewrite names with a regular expression and `\N` backreferences
    Regex {
        #[command(flatten)]
        rule: SearchArgs,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Change letter case
    Case {
        #[command(flatten)]
        rule: CaseArgs,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Replace characters Windows does not allow in names
    Windows {
        #[command(flatten)]
        rule: WindowsArgs,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Use the rule saved in the settings file
    Run {
        #[command(flatten)]
        batch: BatchArgs,
    },
}

impl Command {
    /// The rule given on the command line, `None` for `run`.
    pub fn rule_config(&self) -> Option<RuleConfig> {
        match self {
            Command::Search { rule, .. } => Some(RuleConfig::Search(SearchReplaceConfig {
                pattern: rule.pattern.clone(),
                replace: rule.replace.clone(),
                case_insensitive: rule.case_insensitive,
                ignore_extension: rule.ignore_extension,
            })),
            Command::Regex { rule, .. } => Some(RuleConfig::Regex(RegexConfig {
                pattern: rule.pattern.clone(),
                replace: rule.replace.clone(),
                case_insensitive: rule.case_insensitive,
                ignore_extension: rule.ignore_extension,
            })),
            Command::Case { rule, .. } => Some(RuleConfig::Case(CaseConfig {
                mode: rule.mode.into(),
                extension: rule.extension.into(),
                force: rule.force,
            })),
            Command::Windows { rule, .. } => Some(RuleConfig::Windows(WindowsConfig {
                replace: rule.replace.clone(),
            })),
            Command::Run { .. } => None,
        }
    }

    pub fn batch(&self) -> &BatchArgs {
        match self {
            Command::Search { batch, .. }
            | Command::Regex { batch, .. }
            | Command::Case { batch, .. }
            | Command::Windows { batch, .. }
            | Command::Run { batch } => batch,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Text to look for
    pub pattern: String,
    /// Text to put in its place; may contain `$(attr)` and `$[command]`
    pub replace: String,
    /// Ignore letter case when matching
    #[arg(short = 'i', long)]
    pub case_insensitive: bool,
    /// Leave the extension out of the match
    #[arg(short = 'e', long)]
    pub ignore_extension: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CaseArgs {
    #[arg(long, value_enum, default_value_t = CaseModeArg::Title)]
    pub mode: CaseModeArg,
    /// Case of the extension
    #[arg(long, value_enum, default_value_t = ExtensionCaseArg::Lower)]
    pub extension: ExtensionCaseArg,
    /// In title case, lower-case the rest of every word
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct WindowsArgs {
    /// Replacement for each invalid character; empty deletes them
    #[arg(long, default_value = "_")]
    pub replace: String,
}

/// Which entries to rename and what to do with the result.
#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Files and directories; a directory contributes its entries
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
    /// Kinds of entries to rename
    #[arg(long, value_enum)]
    pub types: Option<FileTypeArg>,
    /// How many expression substitutions may come out empty
    #[arg(long, value_enum)]
    pub replacements: Option<ReplacementArg>,
    /// Reject names containing `/` instead of moving entries
    #[arg(long)]
    pub strict: bool,
    /// Leave entries the rule does not change out of the report
    #[arg(long)]
    pub hide_unchanged: bool,
    /// Perform the renames (default is a preview)
    #[arg(long)]
    pub apply: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Store the rule and options in the settings file
    #[arg(long)]
    pub save: bool,
}

impl BatchArgs {
    /// Overrides `general` with the options given on the command line.
    pub fn apply_to(&self, general: &mut GeneralSettings) {
        if self.recursive {
            general.recursive = true;
        }
        if let Some(types) = self.types {
            general.file_type = types.into();
        }
        if let Some(replacements) = self.replacements {
            general.replacement_mode = replacements.into();
        }
        if self.strict {
            general.name_policy = NamePolicy::Strict;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaseModeArg {
    Title,
    Upper,
    Lower,
}

impl From<CaseModeArg> for CaseMode {
    fn from(arg: CaseModeArg) -> Self {
        match arg {
            CaseModeArg::Title => CaseMode::Title,
            CaseModeArg::Upper => CaseMode::Upper,
            CaseModeArg::Lower => CaseMode::Lower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtensionCaseArg {
    Lower,
    Upper,
    Unchanged,
    SameAsName,
}

impl From<ExtensionCaseArg> for ExtensionCase {
    fn from(arg: ExtensionCaseArg) -> Self {
        match arg {
            ExtensionCaseArg::Lower => ExtensionCase::Lower,
            ExtensionCaseArg::Upper => ExtensionCase::Upper,
            ExtensionCaseArg::Unchanged => ExtensionCase::Unchanged,
            ExtensionCaseArg::SameAsName => ExtensionCase::SameAsName,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileTypeArg {
    All,
    Files,
    Folders,
}

impl From<FileTypeArg> for FileTypeMode {
    fn from(arg: FileTypeArg) -> Self {
        match arg {
            FileTypeArg::All => FileTypeMode::FilesAndFolders,
            FileTypeArg::Files => FileTypeMode::FilesOnly,
            FileTypeArg::Folders => FileTypeMode::FoldersOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplacementArg {
    /// Empty substitutions are fine
    Optional,
    /// At least one substitution must produce text
    Any,
    /// Every substitution must produce text
    All,
}

impl From<ReplacementArg> for ReplacementMode {
    fn from(arg: ReplacementArg) -> Self {
        match arg {
            ReplacementArg::Optional => ReplacementMode::MayAllBeMissing,
            ReplacementArg::Any => ReplacementMode::NeedAny,
            ReplacementArg::All => ReplacementMode::NeedAll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn search_builds_search_rule() {
        let cli = parse(&["batchren", "search", "IMG*", "Photo", "-e", "a.jpg", "b.jpg"]);

        assert_eq!(
            cli.command.rule_config(),
            Some(RuleConfig::Search(SearchReplaceConfig {
                pattern: "IMG*".to_string(),
                replace: "Photo".to_string(),
                case_insensitive: false,
                ignore_extension: true,
            }))
        );
        assert_eq!(
            cli.command.batch().paths,
            vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]
        );
    }

    #[test]
    fn regex_takes_backreferences_verbatim() {
        let cli = parse(&["batchren", "regex", "-i", "(.*)-(.*)", "\\2-\\1", "."]);

        let Some(RuleConfig::Regex(config)) = cli.command.rule_config() else {
            panic!("expected a regex rule");
        };
        assert_eq!(config.replace, "\\2-\\1");
        assert!(config.case_insensitive);
    }

    #[test]
    fn case_defaults_to_title_with_lower_extension() {
        let cli = parse(&["batchren", "case", "."]);

        assert_eq!(
            cli.command.rule_config(),
            Some(RuleConfig::Case(CaseConfig::default()))
        );
    }

    #[test]
    fn case_options() {
        let cli = parse(&[
            "batchren",
            "case",
            "--mode",
            "upper",
            "--extension",
            "same-as-name",
            ".",
        ]);

        assert_eq!(
            cli.command.rule_config(),
            Some(RuleConfig::Case(CaseConfig {
                mode: CaseMode::Upper,
                extension: ExtensionCase::SameAsName,
                force: false,
            }))
        );
    }

    #[test]
    fn windows_replacement_may_be_empty() {
        let cli = parse(&["batchren", "windows", "--replace", "", "."]);

        assert_eq!(
            cli.command.rule_config(),
            Some(RuleConfig::Windows(WindowsConfig {
                replace: String::new()
            }))
        );
    }

    #[test]
    fn run_has_no_rule() {
        let cli = parse(&["batchren", "run", "--apply", "."]);

        assert_eq!(cli.command.rule_config(), None);
        assert!(cli.command.batch().apply);
    }

    #[test]
    fn paths_are_required() {
        assert!(Cli::try_parse_from(["batchren", "case"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["batchren", "run", ".", "-v", "--config", "/tmp/s.toml"]);

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
    }

    #[test]
    fn batch_options_override_settings() {
        let cli = parse(&[
            "batchren",
            "run",
            "-r",
            "--types",
            "files",
            "--replacements",
            "any",
            "--strict",
            ".",
        ]);
        let mut general = GeneralSettings::default();

        cli.command.batch().apply_to(&mut general);

        assert!(general.recursive);
        assert_eq!(general.file_type, FileTypeMode::FilesOnly);
        assert_eq!(general.replacement_mode, ReplacementMode::NeedAny);
        assert_eq!(general.name_policy, NamePolicy::Strict);
    }

    #[test]
    fn absent_options_keep_settings() {
        let cli = parse(&["batchren", "run", "."]);
        let mut general = GeneralSettings {
            recursive: true,
            file_type: FileTypeMode::FoldersOnly,
            replacement_mode: ReplacementMode::MayAllBeMissing,
            name_policy: NamePolicy::Strict,
        };
        let before = general.clone();

        cli.command.batch().apply_to(&mut general);

        assert_eq!(general, before);
    }
}
