//! Manifest mapping store
//!
//! Provides [`ManifestMappingStore`], an insertion-ordered index from file
//! path to [`ManifestMapping`]. Each entry carries the field → column
//! assignments for one vendor manifest and a single [`ParseState`].
//!
//! Parsing is split into [`begin_parse`](ManifestMappingStore::begin_parse)
//! and [`complete_parse`](ManifestMappingStore::complete_parse) so the
//! in-flight state is observable while the parser runs.

use crate::error::{MappingError, MappingIssue};
use indexmap::IndexMap;
use pocf_codec::{ParseError, TabularParser};
use pocf_model::{AttachedFile, FieldMapping, ParsedManifest, TemplateField};
use std::path::Path;

/// Parse lifecycle of one manifest
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParseState {
    /// Never parsed, or reset for retry
    #[default]
    Idle,
    Loading,
    Parsed(ParsedManifest),
    /// Human-readable failure
    Errored(String),
}

impl ParseState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Parsed(_) => "parsed",
            Self::Errored(_) => "errored",
        }
    }
}

/// Mapping state for one attached manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestMapping {
    filename: String,
    path: String,
    mappings: FieldMapping,
    state: ParseState,
    ticket: Option<u64>,
}

impl ManifestMapping {
    fn new(filename: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            mappings: FieldMapping::new(),
            state: ParseState::Idle,
            ticket: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn mappings(&self) -> &FieldMapping {
        &self.mappings
    }

    /// Source column for `field`, if mapped
    #[must_use]
    pub fn column_for(&self, field: TemplateField) -> Option<&str> {
        self.mappings.get(&field).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &ParseState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ParseState::Loading)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ParseState::Errored(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn parsed_data(&self) -> Option<&ParsedManifest> {
        match &self.state {
            ParseState::Parsed(parsed) => Some(parsed),
            _ => None,
        }
    }

    /// Required fields with no (or a blank) source column, in template order
    #[must_use]
    pub fn missing_required(&self) -> Vec<TemplateField> {
        TemplateField::REQUIRED
            .iter()
            .copied()
            .filter(|field| {
                self.mappings
                    .get(field)
                    .map_or(true, |column| column.trim().is_empty())
            })
            .collect()
    }
}

/// Proof that a parse was started; hand it back to `complete_parse`
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a parse ticket must be completed or reset, or the entry stays loading"]
pub struct ParseTicket {
    path: String,
    id: u64,
}

impl ParseTicket {
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Insertion-ordered index of manifest mappings keyed by path
#[derive(Debug, Clone, Default)]
pub struct ManifestMappingStore {
    entries: IndexMap<String, ManifestMapping>,
    next_ticket: u64,
}

impl ManifestMappingStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an idle entry for every manifest path not yet present
    ///
    /// Non-manifest files are ignored and existing entries are left alone,
    /// so calling this twice with the same files is a no-op. Returns the
    /// number of entries added.
    pub fn initialize<'a, I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = &'a AttachedFile>,
    {
        let mut added = 0;
        for file in files.into_iter().filter(|f| f.is_manifest()) {
            if self.entries.contains_key(&file.path) {
                continue;
            }
            self.entries.insert(
                file.path.clone(),
                ManifestMapping::new(&file.filename, &file.path),
            );
            added += 1;
        }
        if added > 0 {
            tracing::debug!(added, total = self.entries.len(), "mapping entries initialized");
        }
        added
    }

    /// Drop the entry for `path`
    pub fn remove(&mut self, path: &str) -> Option<ManifestMapping> {
        self.entries.shift_remove(path)
    }

    /// Move an idle entry to `Loading`
    ///
    /// # Errors
    /// - [`MappingError::UnknownManifest`] if there is no entry for `path`
    /// - [`MappingError::ParseNotAllowed`] if it is loading, parsed or errored
    pub fn begin_parse(&mut self, path: &str) -> Result<ParseTicket, MappingError> {
        let id = self.next_ticket;
        let entry = self.entry_mut(path)?;
        if entry.state != ParseState::Idle {
            return Err(MappingError::ParseNotAllowed {
                path: path.to_string(),
                state: entry.state.name(),
            });
        }
        entry.state = ParseState::Loading;
        entry.ticket = Some(id);
        self.next_ticket += 1;

        tracing::debug!(path, ticket = id, "parse started");
        Ok(ParseTicket {
            path: path.to_string(),
            id,
        })
    }

    /// Record the outcome of a parse started with [`begin_parse`](Self::begin_parse)
    ///
    /// Outcomes for entries that were removed, reset or re-added in the
    /// meantime are dropped. Returns whether the outcome was applied.
    pub fn complete_parse(
        &mut self,
        ticket: ParseTicket,
        outcome: Result<ParsedManifest, ParseError>,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.path) else {
            tracing::debug!(path = %ticket.path, "parse finished for removed manifest; ignored");
            return false;
        };
        if !entry.is_loading() || entry.ticket != Some(ticket.id) {
            tracing::debug!(path = %ticket.path, "stale parse ticket; ignored");
            return false;
        }

        entry.ticket = None;
        entry.state = match outcome {
            Ok(parsed) => {
                tracing::debug!(
                    path = %ticket.path,
                    columns = parsed.columns.len(),
                    rows = parsed.total_rows,
                    "parse finished"
                );
                ParseState::Parsed(parsed)
            }
            Err(e) => {
                tracing::warn!(path = %ticket.path, error = %e, "manifest parse failed");
                ParseState::Errored(e.to_string())
            }
        };
        true
    }

    /// Parse `path` with `parser` and record the result
    ///
    /// A parse failure is not an error here; it ends up as
    /// [`ParseState::Errored`] on the entry. If the returned future is
    /// dropped before the parser finishes, the entry is marked errored with
    /// [`ParseError::Cancelled`] instead of staying `Loading`.
    ///
    /// # Errors
    /// Same as [`begin_parse`](Self::begin_parse).
    pub async fn request_parse(
        &mut self,
        path: &str,
        parser: &dyn TabularParser,
    ) -> Result<&ParseState, MappingError> {
        let ticket = self.begin_parse(path)?;
        let guard = InFlightParse {
            store: &mut *self,
            ticket: Some(ticket),
        };
        let outcome = parser.parse(Path::new(path)).await;
        guard.finish(outcome);
        Ok(self.entry(path)?.state())
    }

    /// Return an entry to `Idle` so it can be parsed again
    ///
    /// Resetting a `Loading` entry abandons its parse: the outstanding
    /// ticket becomes stale and its outcome is ignored.
    ///
    /// # Errors
    /// Returns [`MappingError::UnknownManifest`] if there is no entry.
    pub fn reset_parse(&mut self, path: &str) -> Result<(), MappingError> {
        let entry = self.entry_mut(path)?;
        if entry.ticket.take().is_some() {
            tracing::debug!(path, "in-flight parse abandoned");
        }
        entry.state = ParseState::Idle;
        Ok(())
    }

    /// Map `field` to `column`; other fields are untouched
    ///
    /// # Errors
    /// Returns [`MappingError::UnknownManifest`] if there is no entry.
    pub fn set_mapping(
        &mut self,
        path: &str,
        field: TemplateField,
        column: impl Into<String>,
    ) -> Result<(), MappingError> {
        self.entry_mut(path)?.mappings.insert(field, column.into());
        Ok(())
    }

    /// Remove the mapping for `field`, returning the old column
    ///
    /// # Errors
    /// Returns [`MappingError::UnknownManifest`] if there is no entry.
    pub fn clear_mapping(
        &mut self,
        path: &str,
        field: TemplateField,
    ) -> Result<Option<String>, MappingError> {
        Ok(self.entry_mut(path)?.mappings.remove(&field))
    }

    /// Replace every mapping of `path` at once
    ///
    /// # Errors
    /// Returns [`MappingError::UnknownManifest`] if there is no entry.
    pub fn replace_mappings(
        &mut self,
        path: &str,
        mappings: FieldMapping,
    ) -> Result<(), MappingError> {
        self.entry_mut(path)?.mappings = mappings;
        Ok(())
    }

    /// Required fields not yet mapped for `path`
    ///
    /// # Errors
    /// Returns [`MappingError::UnknownManifest`] if there is no entry.
    pub fn validate_required(&self, path: &str) -> Result<Vec<TemplateField>, MappingError> {
        Ok(self.entry(path)?.missing_required())
    }

    /// Required fields not mapped, plus mappings naming absent columns
    ///
    /// The column check only runs once the file has been parsed.
    ///
    /// # Errors
    /// Returns [`MappingError::UnknownManifest`] if there is no entry.
    pub fn validate_columns(&self, path: &str) -> Result<Vec<MappingIssue>, MappingError> {
        let entry = self.entry(path)?;
        let mut issues: Vec<MappingIssue> = entry
            .missing_required()
            .into_iter()
            .map(MappingIssue::Unmapped)
            .collect();

        if let Some(parsed) = entry.parsed_data() {
            issues.extend(
                entry
                    .mappings
                    .iter()
                    .filter(|(_, column)| !column.trim().is_empty() && !parsed.has_column(column))
                    .map(|(field, column)| MappingIssue::MissingColumn {
                        field: *field,
                        column: column.clone(),
                    }),
            );
        }
        Ok(issues)
    }

    /// Whether any entry is mid-parse
    #[must_use]
    pub fn any_loading(&self) -> bool {
        self.entries.values().any(ManifestMapping::is_loading)
    }

    /// Path of the first entry mid-parse
    #[must_use]
    pub fn first_loading(&self) -> Option<&str> {
        self.entries
            .values()
            .find(|e| e.is_loading())
            .map(ManifestMapping::path)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ManifestMapping> {
        self.entries.get(path)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ManifestMapping> {
        self.entries.values()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, path: &str) -> Result<&ManifestMapping, MappingError> {
        self.entries
            .get(path)
            .ok_or_else(|| MappingError::UnknownManifest(path.to_string()))
    }

    fn entry_mut(&mut self, path: &str) -> Result<&mut ManifestMapping, MappingError> {
        self.entries
            .get_mut(path)
            .ok_or_else(|| MappingError::UnknownManifest(path.to_string()))
    }
}

/// Completes a started parse as cancelled if dropped before `finish`
struct InFlightParse<'a> {
    store: &'a mut ManifestMappingStore,
    ticket: Option<ParseTicket>,
}

impl InFlightParse<'_> {
    fn finish(mut self, outcome: Result<ParsedManifest, ParseError>) {
        if let Some(ticket) = self.ticket.take() {
            self.store.complete_parse(ticket, outcome);
        }
    }
}

impl Drop for InFlightParse<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            tracing::debug!(path = %ticket.path, "parse future dropped");
            self.store.complete_parse(ticket, Err(ParseError::Cancelled));
        }
    }
}
