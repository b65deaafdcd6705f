//! Expression expansion and collision checks for proposed names.
//!
//! Target names may embed `$(attribute)` and `$[shell command]`
//! expressions. They are evaluated per entry by a background worker that
//! also checks whether the final name is already taken on disk.

pub mod attr;
pub mod expand;
pub mod shell;
pub mod worker;

pub use attr::{AttributeSource, AttributeValue, XattrSource};
pub use expand::{expand, scan_expressions, Edit, Expansion, Expression, ExpressionKind};
pub use shell::{ShellRunner, DEFAULT_SHELL};
pub use worker::{
    ProcessItem, ProcessReply, ProcessRequest, ProcessResult, Processor, RenameProcessor,
};
