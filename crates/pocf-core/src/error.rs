//! Error types for the document engine
//!
//! Whole-operation failures (save, load) abort atomically: the in-memory
//! document is never left half-updated. Per-file parse failures are not
//! errors at this level; they live on the manifest's mapping entry.

use crate::config::ConfigError;
use pocf_codec::CodecError;
use pocf_mapping::MappingError;
use std::path::PathBuf;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum PocfError {
    /// Writing the side CSV or the archive failed
    #[error("failed to save {path}: {source}")]
    CodecWrite {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// Reading the archive failed
    #[error("failed to load {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// "Save current" called with no open file
    #[error("no file currently open")]
    NoOpenFile,

    /// Save attempted on a document with no files and no created rows
    #[error("nothing to save: attach a file or add item rows first")]
    EmptyDocument,

    /// Save attempted while a manifest is still being parsed
    #[error("cannot save while {path} is being parsed")]
    ParseInProgress { path: String },

    /// Mapping store rejected the operation
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PocfError {
    /// Check if retrying the same operation may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CodecWrite { .. }
                | Self::ParseInProgress { .. }
                | Self::LoadFailed {
                    source: CodecError::Io { .. } | CodecError::Task(_),
                    ..
                }
        )
    }

    pub(crate) fn codec_write(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::CodecWrite {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn load_failed(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::LoadFailed {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for engine operations
pub type PocfResult<T> = Result<T, PocfError>;
