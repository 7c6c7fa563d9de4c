//! Durable slot backing the ledger
//!
//! A [`LedgerStore`] holds one opaque string: the serialized entry list.

use crate::error::LedgerError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Capability: a single durable key-value slot
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Current content, `None` if nothing was stored
    async fn load(&self) -> Result<Option<String>, LedgerError>;

    /// Replace the content
    async fn store(&self, content: &str) -> Result<(), LedgerError>;

    /// Remove the content
    async fn clear(&self) -> Result<(), LedgerError>;
}

/// Slot backed by a JSON file
///
/// Writes go through a temp file and a rename so a crash never leaves a
/// half-written ledger behind.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("history.json");
        self.path
            .with_file_name(format!(".{name}.tmp-{}", std::process::id()))
    }
}

#[async_trait]
impl LedgerStore for FileLedgerStore {
    async fn load(&self) -> Result<Option<String>, LedgerError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::io_error(&self.path, e)),
        }
    }

    async fn store(&self, content: &str) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LedgerError::io_error(parent, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| LedgerError::io_error(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| LedgerError::io_error(&self.path, e))
    }

    async fn clear(&self) -> Result<(), LedgerError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::io_error(&self.path, e)),
        }
    }
}

/// In-process slot
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    slot: Mutex<Option<String>>,
}

impl MemoryLedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `content`
    #[must_use]
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(content.into())),
        }
    }

    /// Snapshot of the slot
    #[must_use]
    pub fn content(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn load(&self) -> Result<Option<String>, LedgerError> {
        Ok(self.slot.lock().clone())
    }

    async fn store(&self, content: &str) -> Result<(), LedgerError> {
        *self.slot.lock() = Some(content.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), LedgerError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
