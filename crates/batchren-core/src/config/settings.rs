//! Persistent settings loaded from a TOML file.
//!
//! ```toml
//! [general]
//! recursive = false
//! file_type = "files_and_folders"
//! replacement_mode = "need_all"
//! name_policy = "permissive"
//!
//! [processor]
//! shell = "sh"
//!
//! [rule]
//! method = "search"
//! pattern = "IMG*"
//! replace = "Photo"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::fs::FileTypeMode;
use crate::preview::{NamePolicy, ReplacementMode};
use crate::process::DEFAULT_SHELL;
use crate::rule::RuleConfig;

/// Top-level settings.
///
/// All fields have defaults so batchren works without a settings file.
/// The `rule` section holds the rule used last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub processor: ProcessorSettings,
    #[serde(default)]
    pub rule: RuleConfig,
}

impl Settings {
    /// `$HOME/.config/batchren/settings.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(".config")
            .join("batchren")
            .join("settings.toml")
    }

    /// Loads settings from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Writes the settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// - [`CoreError::ConfigSerialize`] if the settings cannot be encoded.
    /// - [`CoreError::PermissionDenied`] if the file is not writable.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::ConfigSerialize(e.to_string()))?;
        let map_err = |e: std::io::Error| match e.kind() {
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(map_err)?;
        }
        std::fs::write(path, content).map_err(map_err)
    }
}

/// Which entries join a batch and how strictly names are checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Descend into subdirectories of directories given on the command line.
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub file_type: FileTypeMode,
    #[serde(default)]
    pub replacement_mode: ReplacementMode,
    #[serde(default)]
    pub name_policy: NamePolicy,
}

/// Expression evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorSettings {
    /// Interpreter for `$[...]` expressions.
    #[serde(default = "default_shell")]
    pub shell: String,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            shell: default_shell(),
        }
    }
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}
