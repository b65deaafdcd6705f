//! Shell command expressions.

use std::path::Path;
use std::process::{Command, Stdio};

/// Default interpreter for `$[...]` expressions.
pub const DEFAULT_SHELL: &str = "sh";

/// Runs `$[...]` scripts through `<shell> -c`.
///
/// The script is handed over as a single argument, so quotes inside it
/// keep their meaning. The source entry's path is exported as `$file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Returns the script's standard output minus one trailing newline.
    ///
    /// A script that cannot be started yields an empty string.
    pub fn run(&self, script: &str, source: &Path) -> String {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(script)
            .env("file", source)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("failed to run {} for {:?}: {e}", self.shell, script);
                return String::new();
            }
        };
        if !output.status.success() {
            tracing::debug!("{:?} exited with {}", script, output.status);
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }
        text
    }
}
