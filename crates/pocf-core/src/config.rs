//! Engine configuration
//!
//! [`PocfConfig`] can be built in code with `with_*` methods or read from a
//! TOML file. Every field is optional in TOML; missing fields take their
//! defaults.
//!
//! ```toml
//! schema_version = "1.0"
//! archive_extension = "pocf"
//! manifest_extensions = ["xlsx", "csv", "pdf"]
//! preview_rows = 10
//! created_manifest_dir = "/tmp/po_creation_form_manifests"
//! extract_dir = "/tmp/po_creation_form_loaded"
//! history_path = "pocf_history.json"
//! ```

use pocf_codec::{SevenZipArchiveCodec, SpreadsheetParser, DEFAULT_PREVIEW_ROWS, DEFAULT_SCHEMA_VERSION};
use pocf_history::FileLedgerStore;
use pocf_model::DEFAULT_MANIFEST_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`PocfConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PocfConfig {
    /// Version tag written into every record
    pub schema_version: String,
    /// Extension of archive files, without dot
    pub archive_extension: String,
    /// Extensions classified as manifests when attaching raw paths
    pub manifest_extensions: Vec<String>,
    /// Rows kept in a parsed preview
    pub preview_rows: usize,
    /// Where created-manifest CSVs are written
    pub created_manifest_dir: PathBuf,
    /// Where archives are extracted on load
    pub extract_dir: PathBuf,
    /// History ledger file
    pub history_path: PathBuf,
}

impl Default for PocfConfig {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        Self {
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            archive_extension: "pocf".to_string(),
            manifest_extensions: DEFAULT_MANIFEST_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            created_manifest_dir: tmp.join("po_creation_form_manifests"),
            extract_dir: tmp.join("po_creation_form_loaded"),
            history_path: PathBuf::from("pocf_history.json"),
        }
    }
}

impl PocfConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text and validate
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and validate
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values that would make the engine misbehave
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "schema_version",
                message: "must not be empty".to_string(),
            });
        }
        let extension = self.archive_extension.as_str();
        if extension.is_empty() || extension.starts_with('.') {
            return Err(ConfigError::Invalid {
                field: "archive_extension",
                message: format!("'{extension}' must be non-empty and have no leading dot"),
            });
        }
        if self.preview_rows == 0 {
            return Err(ConfigError::Invalid {
                field: "preview_rows",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_manifest_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_created_manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.created_manifest_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }

    /// Stock 7z codec using the configured directories
    #[must_use]
    pub fn archive_codec(&self) -> SevenZipArchiveCodec {
        SevenZipArchiveCodec::new(&self.extract_dir, &self.created_manifest_dir)
    }

    /// Stock spreadsheet parser using the configured preview size
    #[must_use]
    pub fn spreadsheet_parser(&self) -> SpreadsheetParser {
        SpreadsheetParser::new().with_preview_rows(self.preview_rows)
    }

    /// File-backed history slot at the configured path
    #[must_use]
    pub fn ledger_store(&self) -> FileLedgerStore {
        FileLedgerStore::new(&self.history_path)
    }
}
