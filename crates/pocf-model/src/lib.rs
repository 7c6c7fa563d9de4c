//! POCF Document Model Types
//!
//! Plain data shared by every layer of the purchase-order engine.
//!
//! # Core Concepts
//!
//! - [`TemplateField`]: the fixed, ordered item template schema
//! - [`PurchaseOrderHeader`]: PO number, buyer, vendor, dates, shipping terms
//! - [`AttachedFile`]: a file attached to the order, keyed by source path
//! - [`ParsedManifest`] / [`ManifestRow`]: vendor previews and in-app rows
//! - [`StateHash`]: rolling hash used for unsaved-change detection
//!
//! # Example
//!
//! ```rust,ignore
//! use pocf_model::{AttachedFile, TemplateField, DEFAULT_MANIFEST_EXTENSIONS};
//!
//! let file = AttachedFile::from_path("/orders/vendor.xlsx", &DEFAULT_MANIFEST_EXTENSIONS);
//! assert!(file.is_manifest());
//! assert_eq!(TemplateField::REQUIRED.len(), 3);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod files;
mod hash;
mod header;
mod manifest;
mod template;

pub use files::{AssetKind, AttachedFile, DEFAULT_MANIFEST_EXTENSIONS};
pub use hash::{HashError, StateHash};
pub use header::{FobType, PurchaseOrderHeader};
pub use manifest::{ManifestRow, ParsedManifest};
pub use template::{TemplateField, UnknownFieldError};

/// Field → source column assignments for one manifest
pub type FieldMapping = std::collections::BTreeMap<TemplateField, String>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
