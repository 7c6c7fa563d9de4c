//! History ledger: recently saved documents
//!
//! The ledger is a convenience index, not a source of truth. Unreadable
//! content is discarded rather than reported.

use crate::entry::HistoryEntry;
use crate::error::LedgerError;
use crate::store::LedgerStore;
use std::path::Path;
use std::sync::Arc;

/// Ordered list of [`HistoryEntry`] persisted in a [`LedgerStore`]
///
/// The slot is read lazily on first use. Every mutation writes the whole
/// list back.
pub struct HistoryLedger {
    store: Arc<dyn LedgerStore>,
    entries: Option<Vec<HistoryEntry>>,
}

impl std::fmt::Debug for HistoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLedger")
            .field("loaded", &self.entries.is_some())
            .field("entries", &self.entries.as_ref().map_or(0, Vec::len))
            .finish_non_exhaustive()
    }
}

impl HistoryLedger {
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            entries: None,
        }
    }

    /// Whether the slot has been read yet
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }

    /// All entries, oldest first
    ///
    /// # Errors
    /// Returns an error only if the store itself fails; corrupt content
    /// yields an empty ledger.
    pub async fn load_all(&mut self) -> Result<&[HistoryEntry], LedgerError> {
        Ok(self.ensure_loaded().await?.as_slice())
    }

    /// Entry for `file_path`, if any
    ///
    /// # Errors
    /// See [`load_all`](Self::load_all).
    pub async fn find(&mut self, file_path: &Path) -> Result<Option<&HistoryEntry>, LedgerError> {
        Ok(self
            .ensure_loaded()
            .await?
            .iter()
            .find(|e| e.is_for(file_path)))
    }

    /// Append `entry`, even if its path is already present
    ///
    /// # Errors
    /// Returns an error if the store fails; the in-memory list is unchanged.
    pub async fn add(&mut self, entry: HistoryEntry) -> Result<(), LedgerError> {
        let mut next = self.ensure_loaded().await?.clone();
        next.push(entry);
        self.commit(next).await
    }

    /// Replace the entry with the same path, or append
    ///
    /// # Errors
    /// Returns an error if the store fails; the in-memory list is unchanged.
    pub async fn upsert(&mut self, entry: HistoryEntry) -> Result<(), LedgerError> {
        let mut next = self.ensure_loaded().await?.clone();
        match next.iter_mut().find(|e| e.file_path == entry.file_path) {
            Some(existing) => *existing = entry,
            None => next.push(entry),
        }
        self.commit(next).await
    }

    /// Remove every entry for `file_path`; returns whether one was removed
    ///
    /// # Errors
    /// Returns an error if the store fails; the in-memory list is unchanged.
    pub async fn remove(&mut self, file_path: &Path) -> Result<bool, LedgerError> {
        let current = self.ensure_loaded().await?;
        let before = current.len();
        let next: Vec<_> = current
            .iter()
            .filter(|e| !e.is_for(file_path))
            .cloned()
            .collect();
        let removed = next.len() != before;
        if removed {
            self.commit(next).await?;
        }
        Ok(removed)
    }

    /// Drop every entry and empty the slot
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub async fn clear(&mut self) -> Result<(), LedgerError> {
        self.store.clear().await?;
        self.entries = Some(Vec::new());
        tracing::debug!("history cleared");
        Ok(())
    }

    async fn ensure_loaded(&mut self) -> Result<&Vec<HistoryEntry>, LedgerError> {
        if self.entries.is_none() {
            let entries = self.read_slot().await?;
            tracing::debug!(entries = entries.len(), "history loaded");
            self.entries = Some(entries);
        }
        Ok(self.entries.get_or_insert_with(Vec::new))
    }

    async fn read_slot(&self) -> Result<Vec<HistoryEntry>, LedgerError> {
        let Some(content) = self.store.load().await? else {
            return Ok(Vec::new());
        };
        match decode(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable history");
                if let Err(clear_err) = self.store.clear().await {
                    tracing::warn!(error = %clear_err, "failed to clear unreadable history");
                }
                Ok(Vec::new())
            }
        }
    }

    async fn commit(&mut self, entries: Vec<HistoryEntry>) -> Result<(), LedgerError> {
        let content = serde_json::to_string(&entries)?;
        self.store.store(&content).await?;
        self.entries = Some(entries);
        Ok(())
    }
}

fn decode(content: &str) -> Result<Vec<HistoryEntry>, LedgerError> {
    serde_json::from_str(content).map_err(|e| LedgerError::Corrupt(e.to_string()))
}
