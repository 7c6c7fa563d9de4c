//! POCF History Ledger
//!
//! Durable list of recently saved documents, one entry per file path.
//!
//! # Core Concepts
//!
//! - [`HistoryLedger`]: lazily loaded, upsert-by-path entry list
//! - [`LedgerStore`]: the durable slot it persists to
//! - [`FileLedgerStore`] / [`MemoryLedgerStore`]: stock slots
//!
//! # Example
//!
//! ```rust,ignore
//! use pocf_history::{FileLedgerStore, HistoryEntry, HistoryLedger};
//! use std::sync::Arc;
//!
//! let mut ledger = HistoryLedger::new(Arc::new(FileLedgerStore::new("history.json")));
//! ledger.upsert(HistoryEntry::new("/orders/a.pocf", 42, "Acme", "07")).await?;
//! for entry in ledger.load_all().await? {
//!     println!("{} {}", entry.po_number, entry.file_path.display());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod entry;
mod error;
mod ledger;
mod store;

pub use entry::HistoryEntry;
pub use error::LedgerError;
pub use ledger::HistoryLedger;
pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
