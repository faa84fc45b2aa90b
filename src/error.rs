//! fnscan error types.
//!
//! All errors are typed and provide root cause information.

use crate::ingest::detect::Language;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for fnscan operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A single file could not be parsed.
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// The file that failed to parse.
        file: PathBuf,
        /// The parse error message.
        message: String,
    },

    /// A tree-sitter grammar could not be loaded.
    #[error("Failed to load {language} grammar: {message}")]
    Grammar {
        /// Language whose grammar failed.
        language: Language,
        /// Loader message.
        message: String,
    },

    /// UTF-8 validation error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// External normalization tool is not installed or cannot be started.
    #[error("External tool '{program}' not available: {reason}")]
    ToolNotFound {
        /// Program name as configured.
        program: String,
        /// Why resolution or spawning failed.
        reason: String,
    },

    /// External normalization tool ran but did not produce a tree.
    #[error("External tool '{program}' failed: {message}")]
    ExternalTool {
        /// Program name as configured.
        program: String,
        /// Exit status and stderr summary.
        message: String,
    },

    /// A backend's batch extraction failed; the whole run is aborted.
    #[error("{language} backend failed: {source}")]
    BackendFailed {
        /// Language of the failing backend.
        language: Language,
        /// The error reported by the backend.
        #[source]
        source: Box<ScanError>,
    },

    /// One or more backends did not settle before the run deadline.
    #[error("Backends {languages:?} did not finish within {timeout:?}")]
    BackendTimeout {
        /// Languages still pending when the deadline passed.
        languages: Vec<Language>,
        /// Configured deadline.
        timeout: Duration,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl ScanError {
    /// Whether this error sinks a backend's whole batch rather than one file.
    ///
    /// Everything else raised while extracting a single file is a per-file
    /// failure: the file contributes no records and the batch continues.
    pub fn is_backend_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::Grammar { .. } | ScanError::ToolNotFound { .. }
        )
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Result type alias for fnscan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
