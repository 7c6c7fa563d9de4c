//! Mapping store errors and validation findings

use pocf_model::TemplateField;
use std::fmt;

/// Errors from [`ManifestMappingStore`](crate::ManifestMappingStore) operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// No mapping entry for this path
    #[error("no manifest mapping for {0}")]
    UnknownManifest(String),

    /// Parse requested while the entry is not idle
    #[error("cannot parse {path}: manifest is {state}")]
    ParseNotAllowed { path: String, state: &'static str },
}

/// One problem found by column validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingIssue {
    /// Required field has no source column
    Unmapped(TemplateField),

    /// Field is mapped to a column the parsed file does not have
    MissingColumn { field: TemplateField, column: String },
}

impl MappingIssue {
    #[must_use]
    pub fn field(&self) -> TemplateField {
        match self {
            Self::Unmapped(field) | Self::MissingColumn { field, .. } => *field,
        }
    }
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmapped(field) => write!(f, "{} is required but not mapped", field.label()),
            Self::MissingColumn { field, column } => write!(
                f,
                "{} is mapped to column '{column}' which does not exist in the file",
                field.label()
            ),
        }
    }
}
