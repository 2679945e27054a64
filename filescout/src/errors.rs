//! Error types for the search pipeline.
//!
//! Every task in a search reports through [`SearchError`]. Two kinds are fatal
//! for the whole search ([`SearchError::Traversal`] and [`SearchError::FileRead`]);
//! the cancellation kinds ([`SearchError::Timeout`] and [`SearchError::Cancelled`])
//! only describe why outstanding work was stopped.
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Traversal failed: {0}")]
    Traversal(#[from] ignore::Error),
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Search timed out after {0:?}")]
    Timeout(Duration),
    #[error("Search cancelled")]
    Cancelled,
    #[error("Search task failed: {0}")]
    TaskFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// True for errors that only say the search was stopped early.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled)
    }

    /// True for errors raised by a task that cancel the rest of the search.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Traversal(_) | Self::FileRead { .. } | Self::TaskFailed(_)
        )
    }

    /// The file the error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FileRead { path, .. } => Some(path),
            _ => None,
        }
    }
}
