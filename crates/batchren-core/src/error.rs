//! Error types for `batchren-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Per-entry problems found
//! while previewing a batch are not errors of this kind; see
//! [`crate::preview::ItemError`].

use std::path::PathBuf;

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A rename would replace an existing entry.
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    /// A proposed name cannot name an entry.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Failed to serialize settings to TOML.
    #[error("config serialize error: {0}")]
    ConfigSerialize(String),

    /// The background rename processor has stopped.
    #[error("rename processor is closed")]
    ProcessorClosed,

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `batchren-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/file"));
        assert_eq!(err.to_string(), "path not found: /missing/file");
    }

    #[test]
    fn permission_denied_displays_path() {
        let err = CoreError::PermissionDenied(PathBuf::from("/secret"));
        assert_eq!(err.to_string(), "permission denied: /secret");
    }

    #[test]
    fn already_exists_displays_path() {
        let err = CoreError::AlreadyExists(PathBuf::from("/music/b.mp3"));
        assert_eq!(err.to_string(), "already exists: /music/b.mp3");
    }

    #[test]
    fn invalid_name_displays_message() {
        let err = CoreError::InvalidName("..".to_string());
        assert_eq!(err.to_string(), "invalid name: ..");
    }

    #[test]
    fn config_errors_display_message() {
        let err = CoreError::ConfigParse("unexpected token".to_string());
        assert_eq!(err.to_string(), "config parse error: unexpected token");
        let err = CoreError::ConfigSerialize("unsupported value".to_string());
        assert_eq!(err.to_string(), "config serialize error: unsupported value");
    }

    #[test]
    fn processor_closed_displays_message() {
        assert_eq!(
            CoreError::ProcessorClosed.to_string(),
            "rename processor is closed"
        );
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "gone");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("gone"));
    }

    #[test]
    fn error_is_debug() {
        let err = CoreError::NotFound(PathBuf::from("/test"));
        let debug = format!("{:?}", err);
        assert!(debug.contains("NotFound"));
    }
}
