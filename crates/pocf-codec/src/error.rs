//! Error types for the codec layer
//!
//! Provides error handling for:
//! - Tabular parsing (vendor file → preview table)
//! - Archive write/read (record ↔ `.pocf` file)
//! - Side CSV export of created manifests

use std::path::PathBuf;

/// Errors while parsing a vendor manifest
///
/// Always scoped to one file; callers record it on that file's mapping
/// entry and carry on with the others.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Source file does not exist
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// No reader registered for the extension
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    /// IO error while reading
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be interpreted as a table
    #[error("failed to read {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// File has no header row or no columns
    #[error("{0} has no columns")]
    Empty(PathBuf),

    /// Background task failed
    #[error("parse task failed: {0}")]
    Task(String),

    /// The caller stopped waiting before the parse finished
    #[error("parse cancelled")]
    Cancelled,
}

impl ParseError {
    /// Create malformed-content error for path
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors while writing or reading archives
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// IO error on a specific path
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be (de)serialized
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression or extraction failed
    #[error("archive error: {0}")]
    Archive(String),

    /// Archive structure is not a POCF document
    #[error("invalid .pocf file: {0}")]
    InvalidArchive(String),

    /// An asset referenced by the record is missing on disk
    #[error("asset file not found: {0}")]
    AssetMissing(PathBuf),

    /// CSV export failed
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Background task failed
    #[error("codec task failed: {0}")]
    Task(String),
}

impl CodecError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::UnsupportedFormat("docx".to_string());
        assert_eq!(err.to_string(), "unsupported file format: .docx");
    }

    #[test]
    fn malformed_error_names_the_file() {
        let err = ParseError::malformed("/tmp/a.csv", "bad quote");
        assert_eq!(err.to_string(), "failed to read /tmp/a.csv: bad quote");
    }

    #[test]
    fn codec_error_display() {
        let err = CodecError::InvalidArchive("manifest.json not found".to_string());
        assert_eq!(err.to_string(), "invalid .pocf file: manifest.json not found");
    }
}
