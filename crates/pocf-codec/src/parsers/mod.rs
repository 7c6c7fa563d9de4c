//! Tabular parsers for vendor manifest files
//!
//! Turns a spreadsheet-like file into a [`ParsedManifest`] preview:
//! - CSV files via the `csv` crate
//! - Excel workbooks (first sheet) via `calamine`
//! - PDF text layers via `pdf-extract`

use crate::error::ParseError;
use async_trait::async_trait;
use pocf_model::ParsedManifest;
use std::path::Path;
use std::sync::Arc;

mod csv_reader;
mod excel_reader;
mod pdf_reader;

pub use csv_reader::CsvReader;
pub use excel_reader::ExcelReader;
pub use pdf_reader::PdfReader;

/// Default number of preview rows kept per manifest
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Capability: parse a file into a tabular preview
///
/// This is the seam the document engine depends on; [`SpreadsheetParser`]
/// is the stock implementation.
#[async_trait]
pub trait TabularParser: Send + Sync {
    /// Parse the file at `path`
    ///
    /// # Errors
    /// Returns a descriptive [`ParseError`] for missing, unreadable or
    /// unsupported files.
    async fn parse(&self, path: &Path) -> Result<ParsedManifest, ParseError>;
}

/// Blocking reader for one family of file formats
pub trait FormatReader: Send + Sync + 'static {
    /// Read headers, up to `preview_rows` rows and the total row count
    fn read(&self, path: &Path, preview_rows: usize) -> Result<ParsedManifest, ParseError>;

    /// Supported file extensions (lowercase, without dot)
    fn extensions(&self) -> &[&str];

    /// Check if this reader can handle the given path
    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Reader priority (higher = tried first when multiple readers match)
    fn priority(&self) -> i32 {
        0
    }
}

/// Registry of format readers, ordered by priority
pub struct ReaderRegistry {
    readers: Vec<Box<dyn FormatReader>>,
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        default_readers()
    }
}

impl std::fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderRegistry")
            .field("reader_count", &self.readers.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl ReaderRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Register a reader
    pub fn register<R: FormatReader>(&mut self, reader: R) {
        self.readers.push(Box::new(reader));
        self.readers
            .sort_by_key(|r| std::cmp::Reverse(r.priority()));
    }

    /// Find reader for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn FormatReader> {
        self.readers.iter().find(|r| r.can_read(path)).map(|r| &**r)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.readers
            .iter()
            .flat_map(|r| r.extensions())
            .copied()
            .collect()
    }
}

/// Create default registry with the built-in readers
#[must_use]
pub fn default_readers() -> ReaderRegistry {
    let mut registry = ReaderRegistry::new();
    registry.register(CsvReader);
    registry.register(ExcelReader);
    registry.register(PdfReader);
    registry
}

/// Stock [`TabularParser`] dispatching on file extension
///
/// Reading happens on the blocking pool so the caller's runtime thread
/// stays responsive.
#[derive(Debug, Clone)]
pub struct SpreadsheetParser {
    registry: Arc<ReaderRegistry>,
    preview_rows: usize,
}

impl SpreadsheetParser {
    /// Parser with the built-in readers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(default_readers())
    }

    /// Parser with a custom registry
    #[must_use]
    pub fn with_registry(registry: ReaderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    /// With preview row limit
    #[inline]
    #[must_use]
    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }

    /// Parse synchronously on the current thread
    ///
    /// # Errors
    /// See [`TabularParser::parse`]
    pub fn parse_blocking(&self, path: &Path) -> Result<ParsedManifest, ParseError> {
        parse_with(&self.registry, path, self.preview_rows)
    }
}

impl Default for SpreadsheetParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_with(
    registry: &ReaderRegistry,
    path: &Path,
    preview_rows: usize,
) -> Result<ParsedManifest, ParseError> {
    if !path.exists() {
        return Err(ParseError::NotFound(path.to_path_buf()));
    }

    let reader = registry.find_for_path(path).ok_or_else(|| {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        ParseError::UnsupportedFormat(extension)
    })?;

    let parsed = reader.read(path, preview_rows)?;
    tracing::debug!(
        path = %path.display(),
        columns = parsed.columns.len(),
        total_rows = parsed.total_rows,
        "parsed manifest"
    );
    Ok(parsed)
}

#[async_trait]
impl TabularParser for SpreadsheetParser {
    async fn parse(&self, path: &Path) -> Result<ParsedManifest, ParseError> {
        let registry = Arc::clone(&self.registry);
        let preview_rows = self.preview_rows;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || parse_with(&registry, &path, preview_rows))
            .await
            .map_err(|e| ParseError::Task(e.to_string()))?
    }
}
