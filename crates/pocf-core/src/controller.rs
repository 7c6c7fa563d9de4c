//! Persistence controller
//!
//! [`PersistenceController`] owns the [`Document`] and is the only way to
//! change it. It tracks unsaved changes, writes and reads archives through
//! an injected [`ArchiveCodec`], and records every save in the
//! [`HistoryLedger`].
//!
//! # Dirty tracking
//!
//! Every mutation sets the dirty flag without hashing. On save and load the
//! controller stores a [`StateHash`] of the save-relevant projection, which
//! [`differs_from_saved`](PersistenceController::differs_from_saved) can
//! compare against later.

use crate::config::PocfConfig;
use crate::convert::{build_record, document_from_record, CreatedManifestFile};
use crate::document::Document;
use crate::error::{PocfError, PocfResult};
use pocf_codec::{ArchiveCodec, ParseError, TabularParser};
use pocf_history::{HistoryEntry, HistoryLedger};
use pocf_mapping::{ParseState, ParseTicket};
use pocf_model::{
    AttachedFile, FieldMapping, HashError, ManifestRow, ParsedManifest, PurchaseOrderHeader,
    StateHash, TemplateField,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What to do with unsaved changes before opening another file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDecision {
    /// Save the current file, then open the new one
    SaveThenLoad,
    /// Drop unsaved changes and open the new one
    DiscardAndLoad,
    /// Keep the current document
    Cancel,
}

/// Asks the user how to handle unsaved changes
#[cfg_attr(test, mockall::automock)]
pub trait UnsavedChangesPrompt {
    /// Called only when the document has unsaved changes
    fn decide(&self, requested: &Path) -> LoadDecision;
}

/// Result of [`PersistenceController::open_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Loaded,
    Cancelled,
}

/// Owner of the editable document and its persistence
pub struct PersistenceController {
    document: Document,
    codec: Arc<dyn ArchiveCodec>,
    parser: Arc<dyn TabularParser>,
    history: HistoryLedger,
    config: PocfConfig,
    current_file_path: Option<PathBuf>,
    has_unsaved_changes: bool,
    last_saved_hash: Option<StateHash>,
}

impl std::fmt::Debug for PersistenceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceController")
            .field("current_file_path", &self.current_file_path)
            .field("has_unsaved_changes", &self.has_unsaved_changes)
            .field("last_saved_hash", &self.last_saved_hash)
            .field("files", &self.document.files().len())
            .finish_non_exhaustive()
    }
}

impl PersistenceController {
    /// Controller over an empty document
    #[must_use]
    pub fn new(
        codec: Arc<dyn ArchiveCodec>,
        parser: Arc<dyn TabularParser>,
        history: HistoryLedger,
        config: PocfConfig,
    ) -> Self {
        let document = Document::default();
        let last_saved_hash = document.state_hash().ok();
        Self {
            document,
            codec,
            parser,
            history,
            config,
            current_file_path: None,
            has_unsaved_changes: false,
            last_saved_hash,
        }
    }

    /// Controller using the stock 7z codec, spreadsheet parser and file ledger
    ///
    /// # Errors
    /// Returns [`PocfError::Config`] if `config` does not validate.
    pub fn from_config(config: PocfConfig) -> PocfResult<Self> {
        config.validate()?;
        let codec = Arc::new(config.archive_codec());
        let parser = Arc::new(config.spreadsheet_parser());
        let history = HistoryLedger::new(Arc::new(config.ledger_store()));
        Ok(Self::new(codec, parser, history, config))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PocfConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn current_file_path(&self) -> Option<&Path> {
        self.current_file_path.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    #[inline]
    #[must_use]
    pub fn last_saved_hash(&self) -> Option<StateHash> {
        self.last_saved_hash
    }

    /// The history ledger (lazily loaded on first use)
    #[inline]
    pub fn history(&mut self) -> &mut HistoryLedger {
        &mut self.history
    }

    /// Whether `path` has the configured archive extension
    #[must_use]
    pub fn is_archive_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.config.archive_extension))
    }

    // ------------------------------------------------------------------
    // Dirty tracking
    // ------------------------------------------------------------------

    /// Hash of the save-relevant projection of the document
    ///
    /// # Errors
    /// Returns [`HashError`] if the projection cannot be serialized.
    pub fn compute_state_hash(&self) -> Result<StateHash, HashError> {
        self.document.state_hash()
    }

    /// Remember the current state as saved and clear the dirty flag
    pub fn mark_as_saved(&mut self) {
        self.last_saved_hash = match self.compute_state_hash() {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "failed to hash document state");
                None
            }
        };
        self.has_unsaved_changes = false;
    }

    /// Set the dirty flag
    #[inline]
    pub fn mark_as_modified(&mut self) {
        self.has_unsaved_changes = true;
    }

    /// Whether the document content differs from the last saved state
    ///
    /// Unlike the dirty flag this compares hashes, so an edit that was
    /// undone by hand reads as unchanged.
    #[must_use]
    pub fn differs_from_saved(&self) -> bool {
        match (self.compute_state_hash(), self.last_saved_hash) {
            (Ok(current), Some(saved)) => current != saved,
            _ => true,
        }
    }

    // ------------------------------------------------------------------
    // Document edits
    // ------------------------------------------------------------------

    pub fn replace_header(&mut self, header: PurchaseOrderHeader) {
        self.document.replace_header(header);
        self.mark_as_modified();
    }

    /// Attach files (set semantics on path); returns how many were new
    pub fn attach_files(&mut self, files: impl IntoIterator<Item = AttachedFile>) -> usize {
        let added = self.document.attach_files(files);
        self.mark_as_modified();
        added
    }

    /// Attach raw paths, classified by the configured manifest extensions
    pub fn attach_paths<I, S>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let added = self
            .document
            .attach_paths(paths, &self.config.manifest_extensions);
        self.mark_as_modified();
        added
    }

    pub fn detach_file(&mut self, path: &str) -> Option<AttachedFile> {
        let removed = self.document.detach_file(path)?;
        self.mark_as_modified();
        Some(removed)
    }

    pub fn replace_created_manifest(&mut self, rows: Vec<ManifestRow>) {
        self.document.replace_created_manifest(rows);
        self.mark_as_modified();
    }

    pub fn clear_created_manifest(&mut self) {
        self.document.clear_created_manifest();
        self.mark_as_modified();
    }

    /// # Errors
    /// [`PocfError::Mapping`] if `path` is not an attached manifest.
    pub fn set_mapping(
        &mut self,
        path: &str,
        field: TemplateField,
        column: impl Into<String>,
    ) -> PocfResult<()> {
        self.document.set_mapping(path, field, column)?;
        self.mark_as_modified();
        Ok(())
    }

    /// # Errors
    /// [`PocfError::Mapping`] if `path` is not an attached manifest.
    pub fn clear_mapping(&mut self, path: &str, field: TemplateField) -> PocfResult<Option<String>> {
        let previous = self.document.clear_mapping(path, field)?;
        self.mark_as_modified();
        Ok(previous)
    }

    /// # Errors
    /// [`PocfError::Mapping`] if `path` is not an attached manifest.
    pub fn replace_mappings(&mut self, path: &str, mappings: FieldMapping) -> PocfResult<()> {
        self.document.replace_mappings(path, mappings)?;
        self.mark_as_modified();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    /// Parse a manifest with the injected parser
    ///
    /// # Errors
    /// [`PocfError::Mapping`] if the entry is unknown or not idle. A parse
    /// failure is recorded on the entry instead.
    pub async fn request_parse(&mut self, path: &str) -> PocfResult<&ParseState> {
        let parser = Arc::clone(&self.parser);
        Ok(self
            .document
            .mappings_mut()
            .request_parse(path, parser.as_ref())
            .await?)
    }

    /// Start a parse the caller drives itself
    ///
    /// # Errors
    /// [`PocfError::Mapping`] if the entry is unknown or not idle.
    pub fn begin_parse(&mut self, path: &str) -> PocfResult<ParseTicket> {
        Ok(self.document.mappings_mut().begin_parse(path)?)
    }

    /// Finish a parse started with [`begin_parse`](Self::begin_parse)
    pub fn complete_parse(
        &mut self,
        ticket: ParseTicket,
        outcome: Result<ParsedManifest, ParseError>,
    ) -> bool {
        self.document.mappings_mut().complete_parse(ticket, outcome)
    }

    /// Allow a manifest to be parsed again
    ///
    /// A parse still in flight is abandoned and its outcome ignored.
    ///
    /// # Errors
    /// [`PocfError::Mapping`] if the entry is unknown.
    pub fn reset_parse(&mut self, path: &str) -> PocfResult<()> {
        Ok(self.document.mappings_mut().reset_parse(path)?)
    }

    // ------------------------------------------------------------------
    // Save / load
    // ------------------------------------------------------------------

    /// Save the document to `path`
    ///
    /// On success `path` becomes the current file, the document is marked
    /// saved and the history entry for `path` is created or refreshed.
    /// On failure nothing changes.
    ///
    /// # Errors
    /// - [`PocfError::EmptyDocument`] if there is no file and no created row
    /// - [`PocfError::ParseInProgress`] while any manifest is being parsed
    /// - [`PocfError::CodecWrite`] if the side CSV or the archive cannot be written
    pub async fn save_to_file(&mut self, path: impl AsRef<Path>) -> PocfResult<()> {
        let path = path.as_ref();
        // Archives without files are rejected on read
        if !self.document.has_content() {
            return Err(PocfError::EmptyDocument);
        }
        if let Some(loading) = self.document.mappings().first_loading() {
            return Err(PocfError::ParseInProgress {
                path: loading.to_string(),
            });
        }

        let created = self.write_created_manifest(path).await?;
        let record = build_record(&self.document, &self.config.schema_version, created.as_ref());

        self.codec
            .write(path, &record)
            .await
            .map_err(|e| PocfError::codec_write(path, e))?;

        self.current_file_path = Some(path.to_path_buf());
        self.mark_as_saved();
        tracing::info!(
            path = %path.display(),
            manifests = record.manifests.len(),
            assets = record.assets.len(),
            "document saved"
        );

        self.record_history(path).await;
        Ok(())
    }

    /// Save to the current file
    ///
    /// # Errors
    /// [`PocfError::NoOpenFile`] if no file is open, otherwise as
    /// [`save_to_file`](Self::save_to_file).
    pub async fn save_current_file(&mut self) -> PocfResult<()> {
        let path = self
            .current_file_path
            .clone()
            .ok_or(PocfError::NoOpenFile)?;
        self.save_to_file(path).await
    }

    /// Replace the document with the one stored at `path`
    ///
    /// The new document is built completely before it replaces the current
    /// one. Saved mappings are restored; no parse is started.
    ///
    /// # Errors
    /// [`PocfError::LoadFailed`] if the archive cannot be read; the current
    /// document is left as it was.
    pub async fn load_from_file(&mut self, path: impl AsRef<Path>) -> PocfResult<()> {
        let path = path.as_ref();
        let record = self
            .codec
            .read(path)
            .await
            .map_err(|e| PocfError::load_failed(path, e))?;

        self.document = document_from_record(record);
        self.current_file_path = Some(path.to_path_buf());
        self.mark_as_saved();

        tracing::info!(
            path = %path.display(),
            files = self.document.files().len(),
            manifests = self.document.mappings().len(),
            "document loaded"
        );
        Ok(())
    }

    /// Open `path`, asking `prompt` first if there are unsaved changes
    ///
    /// With [`LoadDecision::SaveThenLoad`] and no current file the load
    /// goes ahead without saving.
    ///
    /// # Errors
    /// A failed save aborts before loading; otherwise as
    /// [`load_from_file`](Self::load_from_file).
    pub async fn open_file(
        &mut self,
        path: impl AsRef<Path>,
        prompt: &dyn UnsavedChangesPrompt,
    ) -> PocfResult<OpenOutcome> {
        let path = path.as_ref();
        if self.has_unsaved_changes {
            match prompt.decide(path) {
                LoadDecision::Cancel => {
                    tracing::debug!(path = %path.display(), "open cancelled");
                    return Ok(OpenOutcome::Cancelled);
                }
                LoadDecision::SaveThenLoad => match self.current_file_path.clone() {
                    Some(current) => self.save_to_file(current).await?,
                    None => tracing::warn!(
                        path = %path.display(),
                        "no current file to save; loading anyway"
                    ),
                },
                LoadDecision::DiscardAndLoad => {
                    tracing::debug!("discarding unsaved changes");
                }
            }
        }

        self.load_from_file(path).await?;
        Ok(OpenOutcome::Loaded)
    }

    /// Start over with an empty document and no current file
    pub fn new_document(&mut self) {
        self.document = Document::default();
        self.current_file_path = None;
        self.mark_as_saved();
    }

    async fn write_created_manifest(
        &self,
        archive_path: &Path,
    ) -> PocfResult<Option<CreatedManifestFile>> {
        let rows = self.document.created_manifest();
        if rows.is_empty() {
            return Ok(None);
        }

        let filename = format!(
            "created_manifest_{}.csv",
            chrono::Utc::now().timestamp_millis()
        );
        let path = self
            .codec
            .write_csv(rows, &filename)
            .await
            .map_err(|e| PocfError::codec_write(archive_path, e))?;

        tracing::debug!(path = %path.display(), rows = rows.len(), "created manifest exported");
        Ok(Some(CreatedManifestFile {
            filename,
            path: path.to_string_lossy().into_owned(),
        }))
    }

    async fn record_history(&mut self, path: &Path) {
        let header = self.document.header();
        let entry = HistoryEntry::new(
            path,
            header.po_number,
            &header.vendor_name,
            &header.buyer_id,
        );
        if let Err(e) = self.history.upsert(entry).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to update history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocf_history::MemoryLedgerStore;
    use pocf_test_utils::{manifest_file, sample_header, InMemoryArchiveCodec, ScriptedParser};

    fn controller(codec: Arc<InMemoryArchiveCodec>) -> PersistenceController {
        PersistenceController::new(
            codec,
            Arc::new(ScriptedParser::new()),
            HistoryLedger::new(Arc::new(MemoryLedgerStore::new())),
            PocfConfig::default(),
        )
    }

    fn dirty_controller(codec: Arc<InMemoryArchiveCodec>) -> PersistenceController {
        let mut ctl = controller(codec);
        ctl.replace_header(sample_header());
        ctl.attach_files(vec![manifest_file("/in/vendor.csv")]);
        ctl
    }

    #[test]
    fn starts_clean() {
        let ctl = controller(Arc::new(InMemoryArchiveCodec::new()));
        assert!(!ctl.has_unsaved_changes());
        assert!(!ctl.differs_from_saved());
        assert!(ctl.current_file_path().is_none());
    }

    #[test]
    fn mark_as_saved_is_idempotent() {
        let mut ctl = dirty_controller(Arc::new(InMemoryArchiveCodec::new()));
        assert!(ctl.has_unsaved_changes());

        ctl.mark_as_saved();
        let first = ctl.last_saved_hash();
        ctl.mark_as_saved();
        assert!(!ctl.has_unsaved_changes());
        assert_eq!(ctl.last_saved_hash(), first);

        ctl.mark_as_modified();
        assert!(ctl.has_unsaved_changes());
        assert!(!ctl.differs_from_saved());
    }

    #[test]
    fn failed_mapping_edit_does_not_dirty() {
        let mut ctl = controller(Arc::new(InMemoryArchiveCodec::new()));
        let err = ctl
            .set_mapping("/nope.csv", TemplateField::Upc, "Barcode")
            .unwrap_err();
        assert!(matches!(err, PocfError::Mapping(_)));
        assert!(!ctl.has_unsaved_changes());
    }

    #[test]
    fn archive_extension_check() {
        let ctl = controller(Arc::new(InMemoryArchiveCodec::new()));
        assert!(ctl.is_archive_path(Path::new("/x/Order.POCF")));
        assert!(!ctl.is_archive_path(Path::new("/x/order.csv")));
        assert!(!ctl.is_archive_path(Path::new("/x/pocf")));
    }

    #[tokio::test]
    async fn save_current_requires_open_file() {
        let mut ctl = controller(Arc::new(InMemoryArchiveCodec::new()));
        assert!(matches!(
            ctl.save_current_file().await,
            Err(PocfError::NoOpenFile)
        ));
    }

    #[tokio::test]
    async fn cancel_keeps_document() {
        let codec = Arc::new(InMemoryArchiveCodec::new());
        let mut ctl = dirty_controller(Arc::clone(&codec));

        let mut prompt = MockUnsavedChangesPrompt::new();
        prompt
            .expect_decide()
            .times(1)
            .return_const(LoadDecision::Cancel);

        let outcome = ctl.open_file("/other.pocf", &prompt).await.unwrap();
        assert_eq!(outcome, OpenOutcome::Cancelled);
        assert!(ctl.has_unsaved_changes());
        assert!(codec.calls().is_empty());
    }

    #[tokio::test]
    async fn clean_document_skips_prompt() {
        let codec = Arc::new(InMemoryArchiveCodec::new());
        let mut source = dirty_controller(Arc::clone(&codec));
        source.save_to_file("/saved.pocf").await.unwrap();

        let mut ctl = controller(Arc::clone(&codec));
        let mut prompt = MockUnsavedChangesPrompt::new();
        prompt.expect_decide().never();

        let outcome = ctl.open_file("/saved.pocf", &prompt).await.unwrap();
        assert_eq!(outcome, OpenOutcome::Loaded);
        assert_eq!(ctl.document().header().po_number, 42);
    }

    #[tokio::test]
    async fn failed_save_aborts_open() {
        let codec = Arc::new(InMemoryArchiveCodec::new());
        let mut source = dirty_controller(Arc::clone(&codec));
        source.save_to_file("/other.pocf").await.unwrap();

        let mut ctl = dirty_controller(Arc::clone(&codec));
        ctl.save_to_file("/mine.pocf").await.unwrap();
        ctl.replace_header(sample_header().with_po_number(77));
        codec.set_fail_writes(true);

        let mut prompt = MockUnsavedChangesPrompt::new();
        prompt
            .expect_decide()
            .times(1)
            .return_const(LoadDecision::SaveThenLoad);

        let err = ctl.open_file("/other.pocf", &prompt).await.unwrap_err();
        assert!(matches!(err, PocfError::CodecWrite { .. }));
        assert_eq!(ctl.current_file_path(), Some(Path::new("/mine.pocf")));
        assert_eq!(ctl.document().header().po_number, 77);
        assert!(ctl.has_unsaved_changes());
    }

    #[tokio::test]
    async fn new_document_resets_state() {
        let codec = Arc::new(InMemoryArchiveCodec::new());
        let mut ctl = dirty_controller(codec);
        ctl.save_to_file("/a.pocf").await.unwrap();

        ctl.new_document();
        assert!(ctl.document().files().is_empty());
        assert!(ctl.current_file_path().is_none());
        assert!(!ctl.has_unsaved_changes());
    }
}
