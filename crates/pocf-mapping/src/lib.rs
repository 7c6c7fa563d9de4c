//! POCF Manifest Mapping
//!
//! Per-file parse state and template column mappings for vendor manifests.
//!
//! # Overview
//!
//! - **ManifestMappingStore**: path-indexed entries, one per attached manifest
//! - **ParseState**: `Idle → Loading → Parsed | Errored`, one state at a time
//! - **Validation**: required-field gate and column-existence check
//!
//! # Example
//!
//! ```rust,ignore
//! use pocf_mapping::ManifestMappingStore;
//! use pocf_model::TemplateField;
//!
//! let mut store = ManifestMappingStore::new();
//! store.initialize(&document_files);
//! store.request_parse("/orders/vendor.csv", &parser).await?;
//! store.set_mapping("/orders/vendor.csv", TemplateField::ItemNumber, "SKU")?;
//! let missing = store.validate_required("/orders/vendor.csv")?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod store;

pub use error::{MappingError, MappingIssue};
pub use store::{ManifestMapping, ManifestMappingStore, ParseState, ParseTicket};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for mapping operations
    pub use crate::{
        ManifestMapping, ManifestMappingStore, MappingError, MappingIssue, ParseState, ParseTicket,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
