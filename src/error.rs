//! Error types for canvas-pacer.
//!
//! The repaint coordinator itself never fails; errors only arise in the layers around it
//! (configuration loading, terminal setup, argument handling). This module provides a single
//! `thiserror` enum for those layers, and the binary wraps it in `anyhow` at the top level.

use thiserror::Error;

/// The main error type for canvas-pacer operations.
#[derive(Error, Debug)]
pub enum PacerError {
    /// I/O failures (terminal setup, config file reads)
    #[error("I/O operation failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed or failed validation
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Terminal/canvas related errors
    #[error("UI operation failed: {message}")]
    Ui { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for canvas-pacer operations.
pub type Result<T> = std::result::Result<T, PacerError>;

impl PacerError {
    /// Create an Io error from an io::Error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a Config error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a Ui error with a descriptive message
    pub fn ui(message: impl Into<String>) -> Self {
        Self::Ui {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PacerError {
    fn from(err: std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "File not found",
            std::io::ErrorKind::PermissionDenied => "Permission denied",
            _ => "IO operation failed",
        };
        Self::Io {
            message: message.to_string(),
            source: err,
        }
    }
}
