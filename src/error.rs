//! Error types for the tail log source.

use thiserror::Error;

/// The main error type for tail log source operations.
///
/// Only initialization surfaces errors to the caller. Conditions hit while
/// tailing (missing file, read failures) are logged by the tailer task and
/// never returned from a batching call.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// File path errors.
    #[error("Invalid file path: {message}")]
    InvalidPath { message: String },

    /// The log file exists but the process may not read it.
    #[error("Insufficient permissions to read the log file '{path}'")]
    PermissionDenied { path: String },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The configuration could not be deserialized.
    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// The line queue was closed because its session stopped.
    #[error("Line queue closed")]
    QueueClosed,
}

/// A convenient Result type for tail log source operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();

        match error {
            Error::Io(_) => {}
            _ => panic!("Expected Error::Io variant"),
        }

        assert!(error.to_string().contains("I/O error"));
        assert!(error.to_string().contains("File not found"));
    }

    #[test]
    fn test_watcher_error_conversion() {
        let notify_error = notify::Error::generic("inotify limit reached");
        let error: Error = notify_error.into();

        assert!(matches!(error, Error::Watcher(_)));
        assert!(error.to_string().contains("File watcher error"));
        assert!(error.to_string().contains("inotify limit reached"));
    }

    #[test]
    fn test_config_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let error: Error = json_error.into();

        assert!(matches!(error, Error::Config(_)));
        assert!(error.to_string().starts_with("Configuration parse error"));
    }

    #[test]
    fn test_permission_denied_message() {
        let error = Error::PermissionDenied {
            path: "/var/log/secure.log".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Insufficient permissions to read the log file '/var/log/secure.log'"
        );
    }

    #[test]
    fn test_invalid_config_message() {
        let error = Error::InvalidConfig {
            message: "maxLinesPrefetch must be at least 1".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid configuration: maxLinesPrefetch must be at least 1"
        );
    }

    #[test]
    fn test_queue_closed_error() {
        assert_eq!(Error::QueueClosed.to_string(), "Line queue closed");
        assert_eq!(format!("{:?}", Error::QueueClosed), "QueueClosed");
    }

    #[test]
    fn test_error_chain_with_io_error() {
        let io_error = IoError::new(ErrorKind::PermissionDenied, "Access denied");
        let error: Error = io_error.into();

        match &error {
            Error::Io(inner) => {
                assert_eq!(inner.kind(), ErrorKind::PermissionDenied);
                assert_eq!(inner.to_string(), "Access denied");
            }
            _ => panic!("Expected Error::Io variant"),
        }
    }

    #[test]
    fn test_error_send_sync_traits() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
