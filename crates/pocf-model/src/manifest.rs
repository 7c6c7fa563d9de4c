//! Manifest table data: parsed vendor previews and in-app item rows

use crate::template::TemplateField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tabular preview of a vendor manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedManifest {
    /// Header row
    pub columns: Vec<String>,
    /// Preview rows (may be fewer than `total_rows`)
    pub rows: Vec<Vec<String>>,
    /// Data rows in the source, excluding the header
    pub total_rows: usize,
}

impl ParsedManifest {
    #[inline]
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// One item row authored directly in the app
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestRow {
    values: BTreeMap<TemplateField, String>,
}

impl ManifestRow {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell assignment
    #[must_use]
    pub fn with(mut self, field: TemplateField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: TemplateField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Cell value; missing cells read as empty
    #[must_use]
    pub fn get(&self, field: TemplateField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Values in template order, one per field
    #[must_use]
    pub fn to_record(&self) -> Vec<&str> {
        TemplateField::ALL.iter().map(|field| self.get(*field)).collect()
    }
}

impl FromIterator<(TemplateField, String)> for ManifestRow {
    fn from_iter<I: IntoIterator<Item = (TemplateField, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
