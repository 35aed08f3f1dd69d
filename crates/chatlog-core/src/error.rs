//! Error types for the chat log subsystem

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for chat log operations.
///
/// None of these errors ever propagate to the host's event-delivery path.
/// They are reported to the operational log (the `chatlog` tracing target)
/// at the point of failure, and the affected resource becomes inert:
/// a writer that failed to open drops appends, a failed flush is retried
/// by the next timer tick, a failed close is swallowed so shutdown can
/// finish.
#[derive(Error, Debug)]
pub enum ChatlogError {
    /// Could not create the directory that should hold a stream's log file
    #[error("failed to create log directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Could not open a stream's log file in append mode
    #[error("failed to open log file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A durability flush failed; retried on the next flush tick
    #[error("failed to flush log file {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Closing a stream's file handle failed
    #[error("failed to close log file {path}: {source}")]
    Close {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration file could not be parsed or serialized
    #[error("config format error: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    /// General I/O error (config load/save)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
