//! Ledger errors

use std::path::PathBuf;

/// Errors from the history ledger and its stores
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Backing file could not be read or written
    #[error("ledger io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store-specific failure
    #[error("ledger storage error: {0}")]
    Storage(String),

    /// Entries could not be serialized
    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored content is not a valid entry list
    ///
    /// The ledger recovers from this itself; callers never see it.
    #[error("ledger content is corrupt: {0}")]
    Corrupt(String),
}

impl LedgerError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
