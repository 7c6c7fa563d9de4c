//! Files attached to a purchase order

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Extensions treated as vendor manifests when files are attached
pub const DEFAULT_MANIFEST_EXTENSIONS: [&str; 3] = ["xlsx", "csv", "pdf"];

/// Role of an attached file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Vendor item list, subject to column mapping
    Manifest,
    /// Any other supporting document
    Asset,
}

impl AssetKind {
    /// Wire name used in archive records
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AssetKind::Manifest => "Manifest",
            AssetKind::Asset => "Asset",
        }
    }

    /// Parse wire name, case-insensitively
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("manifest") {
            Some(AssetKind::Manifest)
        } else if value.eq_ignore_ascii_case("asset") {
            Some(AssetKind::Asset)
        } else {
            None
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to the document, identified by its source path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachedFile {
    /// Unique key (the source path)
    pub key: String,
    pub filename: String,
    pub path: String,
    pub asset_kind: AssetKind,
}

impl AttachedFile {
    /// Create with an explicit kind
    #[must_use]
    pub fn new(path: impl Into<String>, asset_kind: AssetKind) -> Self {
        let path = path.into();
        Self {
            key: path.clone(),
            filename: file_name_of(&path).to_string(),
            path,
            asset_kind,
        }
    }

    /// Create from a raw path, classifying by extension
    #[must_use]
    pub fn from_path(path: impl Into<String>, manifest_extensions: &[impl AsRef<str>]) -> Self {
        let path = path.into();
        let extension = file_name_of(&path)
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let kind = if manifest_extensions
            .iter()
            .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(&extension))
        {
            AssetKind::Manifest
        } else {
            AssetKind::Asset
        };
        Self::new(path, kind)
    }

    #[inline]
    #[must_use]
    pub fn is_manifest(&self) -> bool {
        self.asset_kind == AssetKind::Manifest
    }
}

/// Last path component, accepting either separator
fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
