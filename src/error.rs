//! Error types for remotelist.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for remotelist operations.
///
/// Every variant is produced during construction of a
/// [`RemoteList`](crate::RemoteList) or while loading a configuration file.
/// Queries against a constructed list never fail.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure: connection error, unreadable body or bad encoding
    #[error("list download failed: {0}")]
    Fetch(String),

    /// Remote answered with a non-success status
    #[error("list download failed with status code: {0}")]
    Status(u16),

    /// Downloaded list could not be written to the local cache
    #[error("list download failed, could not write {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local cache could not be read during initialization
    #[error("error reading local file {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from talking to the remote source.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch(_) | Error::Status(_))
    }
}

/// Result type alias for remotelist operations.
pub type Result<T> = std::result::Result<T, Error>;
