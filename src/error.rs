//! Error types shared across the kmsg reader, process cache, monitor and notifier.

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or interpreting kernel log records.
#[derive(Debug, Error)]
pub enum KmsgError {
    #[error("malformed kmsg entry: {reason}")]
    MalformedEntry { reason: &'static str },

    #[error("invalid kmsg {field} field {value:?}: {source}")]
    InvalidField {
        field: &'static str,
        value: String,
        source: ParseIntError,
    },

    #[error("no PID found in OOM message")]
    NoPidFound,

    #[error("PID {digits} does not fit a process id")]
    PidOverflow { digits: String },

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to seek to end of {}: {source}", path.display())]
    Seek {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to start kmsg ingestion thread: {0}")]
    Spawn(std::io::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read process table {}: {source}", path.display())]
    RefreshFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Construction-time failures; anything else is logged and survived.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Kmsg(#[from] KmsgError),

    #[error("failed to populate process cache: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("slack request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("slack API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
