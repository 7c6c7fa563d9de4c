//! On-disk record shape
//!
//! This is what lands in `manifest.json` inside a `.pocf` archive. Field
//! names are part of the file format; do not rename them.

use chrono::NaiveDate;
use pocf_model::{AssetKind, FobType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag written by this release
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// Serialized purchase order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Passed through unchanged; never interpreted
    pub version: String,
    pub po_number: u32,
    pub buyer_id: String,
    pub vendor: String,
    pub creation_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub cancel_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub ship_to_address: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub shipping_notes: String,
    #[serde(default)]
    pub fob: FobRecord,
    pub manifests: Vec<ManifestEntry>,
    pub assets: Vec<AssetEntry>,
}

impl ArchiveRecord {
    /// Whether the record references any file at all
    #[inline]
    #[must_use]
    pub fn has_files(&self) -> bool {
        !self.manifests.is_empty() || !self.assets.is_empty()
    }
}

/// Freight-on-board terms
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FobRecord {
    #[serde(rename = "type")]
    pub fob_type: FobType,
    #[serde(default)]
    pub point: String,
}

/// Saved column mapping for one manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub path: String,
    /// Template field key → source column
    pub mappings: BTreeMap<String, String>,
    /// Name under `assets/` inside the archive, when it differs from
    /// `filename`. Set by the archive writer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_name: Option<String>,
}

impl ManifestEntry {
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        path: impl Into<String>,
        mappings: BTreeMap<String, String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            mappings,
            stored_name: None,
        }
    }

    /// Name of the file's copy inside the archive
    #[inline]
    #[must_use]
    pub fn archive_name(&self) -> &str {
        self.stored_name.as_deref().unwrap_or(&self.filename)
    }
}

/// An attached file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub filename: String,
    pub path: String,
    pub file_type: String,
    /// Name under `assets/` inside the archive, when it differs from
    /// `filename`. Set by the archive writer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_name: Option<String>,
}

impl AssetEntry {
    #[must_use]
    pub fn new(filename: impl Into<String>, path: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            file_type: kind.as_str().to_string(),
            stored_name: None,
        }
    }

    /// Decoded kind; unknown types are treated as plain assets
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        AssetKind::parse(&self.file_type).unwrap_or(AssetKind::Asset)
    }

    /// Name of the file's copy inside the archive
    #[inline]
    #[must_use]
    pub fn archive_name(&self) -> &str {
        self.stored_name.as_deref().unwrap_or(&self.filename)
    }
}
