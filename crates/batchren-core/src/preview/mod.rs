//! Previewing a batch before anything touches the disk.
//!
//! A [`PreviewSession`] holds the candidate entries, runs the configured
//! rule over all of them, flags names that cannot work ([`ItemError`]) and
//! folds in the results of the background expansion/collision check.

pub mod item;
pub mod session;

pub use item::{ItemError, NamePolicy, PreviewItem};
pub use session::{PreviewSession, RenameSummary, ReplacementMode};
