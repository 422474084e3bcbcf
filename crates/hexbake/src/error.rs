//! Error types for hexbake.

use std::path::PathBuf;

use hexbake_quantum::QuantumError;
use thiserror::Error;

/// Result type for hexbake operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop a bake.
#[derive(Debug, Error)]
pub enum Error {
    /// An output file could not be created or opened for append.
    #[error("failed to open {}: {source}", path.display())]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to an already open output failed.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Saved loop state no longer matches the work it describes.
    #[error("checkpoint corrupt: {0}")]
    CheckpointCorrupt(String),

    /// A configured value is outside its documented range.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// The config file could not be read or parsed.
    #[error("failed to load config {}: {message}", path.display())]
    ConfigLoad { path: PathBuf, message: String },

    /// A dataset file did not have the expected row format.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The host asked the bake to stop.
    #[error("bake cancelled")]
    Cancelled,
}

impl Error {
    /// Whether the failed quantum may be retried as-is.
    ///
    /// Only open failures qualify. Every open happens at the cursor's saved
    /// position, so nothing past the resume point has been written.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FileOpenFailed { .. })
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self::CheckpointCorrupt(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::ConfigInvalid(message.into())
    }
}

impl From<QuantumError> for Error {
    fn from(e: QuantumError) -> Self {
        if e.is_config() {
            Error::ConfigInvalid(e.to_string())
        } else {
            Error::CheckpointCorrupt(e.to_string())
        }
    }
}
