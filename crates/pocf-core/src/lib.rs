//! POCF Document Engine
//!
//! Owns the purchase order being edited and persists it to `.pocf` archives.
//!
//! # Core Concepts
//!
//! - **Document**: header, attached files, manifest mappings, in-app rows
//! - **PersistenceController**: the single writer; every edit goes through it
//!   and marks the document dirty
//! - **Save**: optional side CSV for in-app rows, record assembly, archive
//!   write, history upsert
//! - **Load**: archive read, document rebuilt off to the side, then swapped in
//!
//! # Architecture
//!
//! ```text
//!                     ┌──────────────────────────┐
//!   edits ──────────▶ │  PersistenceController   │ ──▶ HistoryLedger ──▶ LedgerStore
//!                     │  Document + dirty state  │
//!                     └────┬───────────────┬─────┘
//!                          │               │
//!                   TabularParser     ArchiveCodec
//!                   (parse manifests) (.pocf read/write, side CSV)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pocf_core::prelude::*;
//!
//! # async fn example() -> PocfResult<()> {
//! let mut controller = PersistenceController::from_config(PocfConfig::new())?;
//! controller.attach_paths(["/orders/vendor.xlsx"]);
//! controller.request_parse("/orders/vendor.xlsx").await?;
//! controller.set_mapping("/orders/vendor.xlsx", TemplateField::ItemNumber, "SKU")?;
//! controller.save_to_file("/orders/spring.pocf").await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod controller;
mod convert;
pub mod document;
pub mod error;

pub use config::{ConfigError, PocfConfig};
pub use controller::{LoadDecision, OpenOutcome, PersistenceController, UnsavedChangesPrompt};
pub use document::Document;
pub use error::{PocfError, PocfResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the document engine
    pub use crate::config::PocfConfig;
    pub use crate::controller::{
        LoadDecision, OpenOutcome, PersistenceController, UnsavedChangesPrompt,
    };
    pub use crate::document::Document;
    pub use crate::error::{PocfError, PocfResult};
    pub use pocf_codec::{ArchiveCodec, SevenZipArchiveCodec, SpreadsheetParser, TabularParser};
    pub use pocf_history::{HistoryEntry, HistoryLedger};
    pub use pocf_mapping::{MappingIssue, ParseState};
    pub use pocf_model::{
        AssetKind, AttachedFile, ManifestRow, PurchaseOrderHeader, StateHash, TemplateField,
    };
}
