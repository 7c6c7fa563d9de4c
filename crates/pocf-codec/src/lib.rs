//! POCF Codec Layer
//!
//! The boundary between purchase-order documents and the file system.
//!
//! # Core Operations
//!
//! - **Parse**: read a vendor manifest (CSV, Excel, PDF) into a [`ParsedManifest`] preview
//! - **Write**: pack an [`ArchiveRecord`] and its attached files into a `.pocf` archive
//! - **Read**: extract a `.pocf` archive and return its record with local paths
//! - **Export**: write in-app item rows to a side CSV
//!
//! # Architecture
//!
//! ```text
//! vendor.xlsx → TabularParser → ParsedManifest
//! ArchiveRecord + assets → ArchiveCodec → order.pocf (7z: manifest.json + assets/)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pocf_codec::prelude::*;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = SpreadsheetParser::new();
//! let preview = parser.parse(Path::new("vendor.csv")).await?;
//!
//! let codec = SevenZipArchiveCodec::default();
//! let record = codec.read(Path::new("order.pocf")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ParsedManifest`]: pocf_model::ParsedManifest

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod archive;
pub mod csv_export;
pub mod error;
pub mod parsers;
pub mod record;

pub use archive::{ArchiveCodec, SevenZipArchiveCodec, ASSETS_DIR, MANIFEST_FILE};
pub use csv_export::write_manifest_csv;
pub use error::{CodecError, ParseError};
pub use parsers::{SpreadsheetParser, TabularParser, DEFAULT_PREVIEW_ROWS};
pub use record::{ArchiveRecord, AssetEntry, FobRecord, ManifestEntry, DEFAULT_SCHEMA_VERSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the codec layer
    pub use crate::archive::{ArchiveCodec, SevenZipArchiveCodec};
    pub use crate::error::{CodecError, ParseError};
    pub use crate::parsers::{
        CsvReader, ExcelReader, FormatReader, PdfReader, ReaderRegistry, SpreadsheetParser,
        TabularParser,
    };
    pub use crate::record::{ArchiveRecord, AssetEntry, FobRecord, ManifestEntry};
}
