//! Error taxonomy for the fetch pipeline.
//!
//! Every failure is fatal for the layer that sees it; nothing here is retried.
//! `kind()` folds the variants into the coarse categories callers branch on.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Coarse category of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or HTTP failure.
    Transport,
    /// Response or index body did not decode into the expected shape.
    Decode,
    /// Directory or file operation failed.
    Storage,
    /// Invalid configuration value.
    Config,
    /// Stopped by the cancel token (abort policy or user interrupt).
    Cancelled,
    /// Detail phase finished but at least one group failed.
    Incomplete,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid page {id:?}: {reason}")]
    InvalidPage { id: String, reason: &'static str },

    #[error("duplicate page id {id:?} in index")]
    DuplicatePage { id: String },

    #[error("index incomplete: server reported {expected} pages, received {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("{}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cancelled before the remaining pages were fetched")]
    Cancelled,

    #[error("worker for group {group} exited without reporting")]
    WorkerLost { group: usize },

    #[error("{failed} of {total} group(s) failed")]
    GroupsFailed { failed: usize, total: usize },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport { .. } | FetchError::Http { .. } => ErrorKind::Transport,
            FetchError::Decode { .. }
            | FetchError::InvalidPage { .. }
            | FetchError::DuplicatePage { .. }
            | FetchError::CountMismatch { .. } => ErrorKind::Decode,
            FetchError::Storage { .. } | FetchError::NotADirectory { .. } => ErrorKind::Storage,
            FetchError::Config(_) => ErrorKind::Config,
            FetchError::Cancelled => ErrorKind::Cancelled,
            FetchError::WorkerLost { .. } | FetchError::GroupsFailed { .. } => {
                ErrorKind::Incomplete
            }
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(what: impl Into<String>, source: serde_json::Error) -> Self {
        FetchError::Decode {
            what: what.into(),
            source,
        }
    }
}
