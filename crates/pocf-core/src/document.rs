//! The editable purchase order
//!
//! A [`Document`] owns the header, the attached files, one mapping entry per
//! attached manifest, and the rows typed in-app. Files and mapping entries
//! are kept in step: attaching a manifest creates its entry, detaching it
//! drops the entry.

use pocf_mapping::{ManifestMappingStore, MappingError};
use pocf_model::{
    AttachedFile, FieldMapping, HashError, ManifestRow, PurchaseOrderHeader, StateHash,
    TemplateField,
};
use serde::Serialize;

/// The purchase order being edited
#[derive(Debug, Clone, Default)]
pub struct Document {
    header: PurchaseOrderHeader,
    files: Vec<AttachedFile>,
    mappings: ManifestMappingStore,
    created_manifest: Vec<ManifestRow>,
}

impl Document {
    /// Empty document with `header`
    #[must_use]
    pub fn new(header: PurchaseOrderHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn header(&self) -> &PurchaseOrderHeader {
        &self.header
    }

    /// Attached files in attach order
    #[inline]
    #[must_use]
    pub fn files(&self) -> &[AttachedFile] {
        &self.files
    }

    #[must_use]
    pub fn file(&self, path: &str) -> Option<&AttachedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    #[inline]
    #[must_use]
    pub fn mappings(&self) -> &ManifestMappingStore {
        &self.mappings
    }

    #[inline]
    pub(crate) fn mappings_mut(&mut self) -> &mut ManifestMappingStore {
        &mut self.mappings
    }

    #[inline]
    #[must_use]
    pub fn created_manifest(&self) -> &[ManifestRow] {
        &self.created_manifest
    }

    /// Whether a save would carry any file: an attachment or created rows
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.files.is_empty() || !self.created_manifest.is_empty()
    }

    pub fn replace_header(&mut self, header: PurchaseOrderHeader) {
        self.header = header;
    }

    /// Attach files, ignoring paths already present; returns how many were added
    pub fn attach_files(&mut self, files: impl IntoIterator<Item = AttachedFile>) -> usize {
        let mut added = 0;
        for file in files {
            if self.file(&file.path).is_some() {
                continue;
            }
            self.files.push(file);
            added += 1;
        }
        self.mappings.initialize(&self.files);
        added
    }

    /// Attach raw paths, classifying them by extension
    pub fn attach_paths<I, S>(&mut self, paths: I, manifest_extensions: &[impl AsRef<str>]) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: Vec<_> = paths
            .into_iter()
            .map(|p| AttachedFile::from_path(p, manifest_extensions))
            .collect();
        self.attach_files(files)
    }

    /// Detach a file together with its mapping entry
    pub fn detach_file(&mut self, path: &str) -> Option<AttachedFile> {
        let index = self.files.iter().position(|f| f.path == path)?;
        let file = self.files.remove(index);
        self.mappings.remove(path);
        Some(file)
    }

    pub fn replace_created_manifest(&mut self, rows: Vec<ManifestRow>) {
        self.created_manifest = rows;
    }

    pub fn clear_created_manifest(&mut self) {
        self.created_manifest.clear();
    }

    /// # Errors
    /// [`MappingError::UnknownManifest`] if `path` is not an attached manifest.
    pub fn set_mapping(
        &mut self,
        path: &str,
        field: TemplateField,
        column: impl Into<String>,
    ) -> Result<(), MappingError> {
        self.mappings.set_mapping(path, field, column)
    }

    /// # Errors
    /// [`MappingError::UnknownManifest`] if `path` is not an attached manifest.
    pub fn clear_mapping(
        &mut self,
        path: &str,
        field: TemplateField,
    ) -> Result<Option<String>, MappingError> {
        self.mappings.clear_mapping(path, field)
    }

    /// # Errors
    /// [`MappingError::UnknownManifest`] if `path` is not an attached manifest.
    pub fn replace_mappings(&mut self, path: &str, mappings: FieldMapping) -> Result<(), MappingError> {
        self.mappings.replace_mappings(path, mappings)
    }

    /// Hash of everything a save would persist
    ///
    /// Parse previews and loading state are excluded.
    ///
    /// # Errors
    /// Returns [`HashError`] if the projection cannot be serialized.
    pub fn state_hash(&self) -> Result<StateHash, HashError> {
        StateHash::compute_serializable(&self.snapshot())
    }

    fn snapshot(&self) -> StateSnapshot<'_> {
        StateSnapshot {
            header: &self.header,
            files: &self.files,
            manifest_mappings: self
                .mappings
                .iter()
                .map(|m| MappingSnapshot {
                    filename: m.filename(),
                    mappings: m.mappings(),
                })
                .collect(),
            created_manifest: &self.created_manifest,
        }
    }
}

#[derive(Serialize)]
struct StateSnapshot<'a> {
    header: &'a PurchaseOrderHeader,
    files: &'a [AttachedFile],
    manifest_mappings: Vec<MappingSnapshot<'a>>,
    created_manifest: &'a [ManifestRow],
}

#[derive(Serialize)]
struct MappingSnapshot<'a> {
    filename: &'a str,
    mappings: &'a FieldMapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocf_model::ParsedManifest;
    use pocf_test_utils::{asset_file, manifest_file, sample_header, sample_rows};

    #[test]
    fn attach_dedups_by_path() {
        let mut doc = Document::new(sample_header());
        let added = doc.attach_files(vec![
            manifest_file("/a.csv"),
            asset_file("/datasheet.pdf"),
            manifest_file("/a.csv"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(doc.attach_files(vec![manifest_file("/a.csv")]), 0);
        assert_eq!(doc.files().len(), 2);
        assert_eq!(doc.mappings().len(), 1);
    }

    #[test]
    fn attach_paths_classifies() {
        let mut doc = Document::default();
        doc.attach_paths(["C:\\in\\Vendor.XLSX", "/in/photo.jpg"], &["xlsx", "csv"]);
        assert!(doc.file("C:\\in\\Vendor.XLSX").unwrap().is_manifest());
        assert_eq!(doc.file("C:\\in\\Vendor.XLSX").unwrap().filename, "Vendor.XLSX");
        assert!(!doc.file("/in/photo.jpg").unwrap().is_manifest());
        assert_eq!(doc.mappings().len(), 1);
    }

    #[test]
    fn detach_drops_mapping_entry() {
        let mut doc = Document::default();
        doc.attach_files(vec![manifest_file("/a.csv"), manifest_file("/b.csv")]);
        doc.set_mapping("/a.csv", TemplateField::Upc, "Barcode").unwrap();

        let removed = doc.detach_file("/a.csv").unwrap();
        assert_eq!(removed.filename, "a.csv");
        assert!(!doc.mappings().contains("/a.csv"));
        assert!(doc.detach_file("/a.csv").is_none());
        assert!(doc.set_mapping("/a.csv", TemplateField::Upc, "x").is_err());
    }

    #[test]
    fn content_needs_a_file_or_rows() {
        let mut doc = Document::new(sample_header());
        assert!(!doc.has_content());

        doc.replace_created_manifest(sample_rows());
        assert!(doc.has_content());
        doc.clear_created_manifest();

        doc.attach_files(vec![asset_file("/in/datasheet.pdf")]);
        assert!(doc.has_content());
        doc.detach_file("/in/datasheet.pdf");
        assert!(!doc.has_content());
    }

    #[test]
    fn hash_tracks_saved_content_only() {
        let mut doc = Document::new(sample_header());
        doc.attach_files(vec![manifest_file("/a.csv")]);
        let base = doc.state_hash().unwrap();
        assert_eq!(doc.state_hash().unwrap(), base);

        // Parse state is not persisted
        let ticket = doc.mappings_mut().begin_parse("/a.csv").unwrap();
        doc.mappings_mut().complete_parse(ticket, Ok(ParsedManifest::default()));
        assert_eq!(doc.state_hash().unwrap(), base);

        doc.set_mapping("/a.csv", TemplateField::ItemNumber, "SKU").unwrap();
        let mapped = doc.state_hash().unwrap();
        assert_ne!(mapped, base);

        doc.replace_created_manifest(sample_rows());
        assert_ne!(doc.state_hash().unwrap(), mapped);

        doc.clear_created_manifest();
        assert_eq!(doc.state_hash().unwrap(), mapped);
    }
}
