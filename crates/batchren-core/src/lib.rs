//! batchren core library: UI-agnostic batch rename logic.
//!
//! `batchren-core` computes new names for a batch of files, highlights what
//! changed, expands `$(attribute)` / `$[shell]` expressions, detects
//! collisions and finally performs the renames. It is decoupled from any
//! frontend; the `batchren` command-line tool is one consumer.
//!
//! # Modules
//!
//! - [`rule`]: The four rename rules and the [`Group`] highlight model.
//! - [`process`]: Expression expansion and on-disk collision checks, run by a background worker.
//! - [`preview`]: The batch under preview: per-entry targets, errors and duplicate detection.
//! - [`fs`]: Candidate entries ([`FileEntry`]), entry collection and the final rename.
//! - [`config`]: TOML-based settings.
//! - [`event`]: Batch membership changes fed in by entry discovery.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod error;
pub mod event;
pub mod fs;
pub mod preview;
pub mod process;
pub mod rule;

pub use config::settings::{GeneralSettings, ProcessorSettings, Settings};
pub use error::{CoreError, CoreResult};
pub use event::EntryChange;
pub use fs::entry::FileEntry;
pub use fs::ops::{
    collect_entries, read_directory, rename_entry, target_exists, target_path, FileTypeMode,
};
pub use preview::{
    ItemError, NamePolicy, PreviewItem, PreviewSession, RenameSummary, ReplacementMode,
};
pub use process::{
    Edit, ProcessItem, ProcessReply, ProcessRequest, ProcessResult, Processor, RenameProcessor,
    ShellRunner, XattrSource,
};
pub use rule::{Group, RenameOutcome, Rule, RuleConfig};
