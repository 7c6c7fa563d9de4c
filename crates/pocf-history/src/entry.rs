//! Ledger entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One saved document, keyed by `file_path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub file_path: PathBuf,
    pub po_number: u32,
    pub vendor: String,
    pub buyer_id: String,
    pub saved_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Entry stamped with the current time
    #[must_use]
    pub fn new(
        file_path: impl Into<PathBuf>,
        po_number: u32,
        vendor: impl Into<String>,
        buyer_id: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            po_number,
            vendor: vendor.into(),
            buyer_id: buyer_id.into(),
            saved_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_saved_at(mut self, saved_at: DateTime<Utc>) -> Self {
        self.saved_at = saved_at;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_for(&self, file_path: &Path) -> bool {
        self.file_path == file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let saved_at = DateTime::parse_from_rfc3339("2024-03-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = HistoryEntry::new("/orders/a.pocf", 42, "Acme", "07").with_saved_at(saved_at);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["filePath"], "/orders/a.pocf");
        assert_eq!(json["poNumber"], 42);
        assert_eq!(json["buyerId"], "07");
        assert_eq!(json["savedAt"], "2024-03-15T10:00:00Z");
    }

    #[test]
    fn reads_browser_style_timestamps() {
        let json = r#"{"filePath":"/a.pocf","poNumber":1,"vendor":"V","buyerId":"01","savedAt":"2024-03-15T10:00:00.123Z"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_for(Path::new("/a.pocf")));
    }
}
