//! File system side of a batch rename.
//!
//! [`entry::FileEntry`] describes a candidate, [`ops`] collects candidates
//! from user-supplied paths and performs the final renames.

pub mod entry;
pub mod ops;

pub use ops::FileTypeMode;
