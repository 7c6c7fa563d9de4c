//! Testing utilities for POCF workspace
//!
//! Shared test doubles, fixtures, and tracing setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use pocf_codec::{ArchiveCodec, ArchiveRecord, CodecError, ParseError, TabularParser};
use pocf_model::{AttachedFile, ManifestRow, ParsedManifest, PurchaseOrderHeader, TemplateField};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Archive codec double
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecCall {
    Write(PathBuf),
    Read(PathBuf),
    WriteCsv(String),
}

#[derive(Debug, Default)]
struct CodecState {
    calls: Vec<CodecCall>,
    archives: HashMap<PathBuf, ArchiveRecord>,
    csv_files: HashMap<PathBuf, Vec<ManifestRow>>,
    fail_writes: bool,
    fail_csv: bool,
}

/// Archive codec keeping everything in memory and logging every call
#[derive(Debug)]
pub struct InMemoryArchiveCodec {
    csv_dir: PathBuf,
    state: Mutex<CodecState>,
}

impl Default for InMemoryArchiveCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryArchiveCodec {
    pub fn new() -> Self {
        Self {
            csv_dir: PathBuf::from("/virtual/manifests"),
            state: Mutex::new(CodecState::default()),
        }
    }

    pub fn failing_writes(self) -> Self {
        self.state.lock().fail_writes = true;
        self
    }

    pub fn failing_csv(self) -> Self {
        self.state.lock().fail_csv = true;
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn insert_archive(&self, path: impl Into<PathBuf>, record: ArchiveRecord) {
        self.state.lock().archives.insert(path.into(), record);
    }

    pub fn archive(&self, path: &Path) -> Option<ArchiveRecord> {
        self.state.lock().archives.get(path).cloned()
    }

    pub fn csv_rows(&self, path: &Path) -> Option<Vec<ManifestRow>> {
        self.state.lock().csv_files.get(path).cloned()
    }

    pub fn calls(&self) -> Vec<CodecCall> {
        self.state.lock().calls.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, CodecCall::Write(_)))
            .count()
    }
}

#[async_trait]
impl ArchiveCodec for InMemoryArchiveCodec {
    async fn write(&self, path: &Path, record: &ArchiveRecord) -> Result<(), CodecError> {
        let mut state = self.state.lock();
        state.calls.push(CodecCall::Write(path.to_path_buf()));
        if state.fail_writes {
            return Err(CodecError::Archive("simulated write failure".to_string()));
        }
        state.archives.insert(path.to_path_buf(), record.clone());
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<ArchiveRecord, CodecError> {
        let mut state = self.state.lock();
        state.calls.push(CodecCall::Read(path.to_path_buf()));
        let record = state
            .archives
            .get(path)
            .cloned()
            .ok_or_else(|| CodecError::InvalidArchive(format!("{} not found", path.display())))?;
        if !record.has_files() {
            return Err(CodecError::InvalidArchive(
                "record has no manifests or assets".to_string(),
            ));
        }
        Ok(record)
    }

    async fn write_csv(
        &self,
        rows: &[ManifestRow],
        filename: &str,
    ) -> Result<PathBuf, CodecError> {
        let mut state = self.state.lock();
        state.calls.push(CodecCall::WriteCsv(filename.to_string()));
        if state.fail_csv {
            return Err(CodecError::Archive("simulated csv failure".to_string()));
        }
        let path = self.csv_dir.join(filename);
        state.csv_files.insert(path.clone(), rows.to_vec());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Parser double
// ---------------------------------------------------------------------------

/// Parser answering from a script keyed by path
#[derive(Debug, Default)]
pub struct ScriptedParser {
    script: HashMap<PathBuf, Result<ParsedManifest, String>>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, path: impl Into<PathBuf>, parsed: ParsedManifest) -> Self {
        self.script.insert(path.into(), Ok(parsed));
        self
    }

    pub fn with_failure(mut self, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        self.script.insert(path.into(), Err(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TabularParser for ScriptedParser {
    async fn parse(&self, path: &Path) -> Result<ParsedManifest, ParseError> {
        self.calls.lock().push(path.to_path_buf());
        match self.script.get(path) {
            Some(Ok(parsed)) => Ok(parsed.clone()),
            Some(Err(message)) => Err(ParseError::malformed(path, message.clone())),
            None => Err(ParseError::NotFound(path.to_path_buf())),
        }
    }
}

/// Parser whose parse never completes
#[derive(Debug, Default)]
pub struct StalledParser;

#[async_trait]
impl TabularParser for StalledParser {
    async fn parse(&self, _path: &Path) -> Result<ParsedManifest, ParseError> {
        std::future::pending().await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn sample_header() -> PurchaseOrderHeader {
    PurchaseOrderHeader::new(sample_date())
        .with_po_number(42)
        .with_buyer_id("07")
        .with_vendor("Acme Wholesale")
}

pub fn manifest_file(path: &str) -> AttachedFile {
    AttachedFile::new(path, pocf_model::AssetKind::Manifest)
}

pub fn asset_file(path: &str) -> AttachedFile {
    AttachedFile::new(path, pocf_model::AssetKind::Asset)
}

/// Preview with the given columns and `total_rows` generated rows (first 10 kept)
pub fn sample_manifest(columns: &[&str], total_rows: usize) -> ParsedManifest {
    let rows = (0..total_rows.min(10))
        .map(|i| columns.iter().map(|c| format!("{c}-{i}")).collect())
        .collect();
    ParsedManifest {
        columns: columns.iter().map(|c| (*c).to_string()).collect(),
        rows,
        total_rows,
    }
}

pub fn sample_rows() -> Vec<ManifestRow> {
    vec![
        ManifestRow::new()
            .with(TemplateField::ItemNumber, "A-100")
            .with(TemplateField::Description, "Canvas tote")
            .with(TemplateField::Department, "12"),
        ManifestRow::new()
            .with(TemplateField::ItemNumber, "A-101")
            .with(TemplateField::Description, "Garden gloves")
            .with(TemplateField::Department, "14")
            .with(TemplateField::Cases, "3"),
    ]
}
