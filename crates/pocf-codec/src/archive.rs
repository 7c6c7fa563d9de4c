//! Archive codec: record ↔ `.pocf` file
//!
//! A `.pocf` file is a 7z archive with this layout:
//!
//! ```text
//! manifest.json      serialized ArchiveRecord
//! assets/<filename>  every attached manifest and asset
//! ```

use crate::csv_export::write_manifest_csv;
use crate::error::CodecError;
use crate::record::ArchiveRecord;
use async_trait::async_trait;
use pocf_model::ManifestRow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the record inside the archive
pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory holding attached files inside the archive
pub const ASSETS_DIR: &str = "assets";

/// Capability: persist records to archive files
///
/// Implementations must leave any existing file at the target untouched
/// if writing fails part-way.
#[async_trait]
pub trait ArchiveCodec: Send + Sync {
    /// Write `record` and every file it references to `path`
    async fn write(&self, path: &Path, record: &ArchiveRecord) -> Result<(), CodecError>;

    /// Read a record back; returned paths point at extracted copies
    async fn read(&self, path: &Path) -> Result<ArchiveRecord, CodecError>;

    /// Export in-app rows to a CSV named `filename`, returning its path
    async fn write_csv(&self, rows: &[ManifestRow], filename: &str)
        -> Result<PathBuf, CodecError>;
}

/// 7z-backed [`ArchiveCodec`]
#[derive(Debug, Clone)]
pub struct SevenZipArchiveCodec {
    staging_root: PathBuf,
    extract_root: PathBuf,
    csv_dir: PathBuf,
}

impl Default for SevenZipArchiveCodec {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        Self::new(
            tmp.join("po_creation_form_loaded"),
            tmp.join("po_creation_form_manifests"),
        )
    }
}

impl SevenZipArchiveCodec {
    /// Codec extracting under `extract_root` and exporting CSVs to `csv_dir`
    #[must_use]
    pub fn new(extract_root: impl Into<PathBuf>, csv_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: std::env::temp_dir(),
            extract_root: extract_root.into(),
            csv_dir: csv_dir.into(),
        }
    }

    /// With directory used to stage archive contents before compression
    #[inline]
    #[must_use]
    pub fn with_staging_root(mut self, staging_root: impl Into<PathBuf>) -> Self {
        self.staging_root = staging_root.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn extract_root(&self) -> &Path {
        &self.extract_root
    }

    #[inline]
    #[must_use]
    pub fn csv_dir(&self) -> &Path {
        &self.csv_dir
    }
}

#[async_trait]
impl ArchiveCodec for SevenZipArchiveCodec {
    async fn write(&self, path: &Path, record: &ArchiveRecord) -> Result<(), CodecError> {
        let staging = self.staging_root.join(format!("pocf_save_{}", Uuid::new_v4()));
        let dest = path.to_path_buf();
        let mut record = record.clone();
        assign_stored_names(&mut record);
        run_blocking(move || write_archive(&staging, &dest, &record)).await?;
        tracing::info!(path = %path.display(), "archive written");
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<ArchiveRecord, CodecError> {
        let extract_dir = self.extract_root.join(format!("pocf_{}", Uuid::new_v4()));
        let src = path.to_path_buf();
        let record = run_blocking(move || read_archive(&src, &extract_dir)).await?;
        tracing::info!(
            path = %path.display(),
            manifests = record.manifests.len(),
            assets = record.assets.len(),
            "archive read"
        );
        Ok(record)
    }

    async fn write_csv(
        &self,
        rows: &[ManifestRow],
        filename: &str,
    ) -> Result<PathBuf, CodecError> {
        let dir = self.csv_dir.clone();
        let dest = dir.join(filename);
        let rows = rows.to_vec();
        run_blocking(move || {
            fs::create_dir_all(&dir).map_err(|e| CodecError::io_error(&dir, e))?;
            write_manifest_csv(&rows, &dest)?;
            Ok(dest)
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, CodecError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CodecError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CodecError::Task(e.to_string()))?
}

/// Give every distinct source path its own name under `assets/`
///
/// The first file with a given name keeps it; later ones with the same
/// name (compared case-insensitively) get a numeric prefix. Entries that
/// share a path share the name. `stored_name` is only set when the name
/// differs from `filename`.
fn assign_stored_names(record: &mut ArchiveRecord) {
    let mut by_path: HashMap<String, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut name_for = |filename: &str, path: &str| -> Option<String> {
        let name = match by_path.get(path) {
            Some(name) => name.clone(),
            None => {
                let mut candidate = filename.to_string();
                let mut n = 1;
                while !taken.insert(candidate.to_lowercase()) {
                    candidate = format!("{n}_{filename}");
                    n += 1;
                }
                by_path.insert(path.to_string(), candidate.clone());
                candidate
            }
        };
        (name != filename).then_some(name)
    };

    for manifest in &mut record.manifests {
        manifest.stored_name = name_for(&manifest.filename, &manifest.path);
    }
    for asset in &mut record.assets {
        asset.stored_name = name_for(&asset.filename, &asset.path);
    }
}

/// Reject member names that would escape the assets directory
fn checked_member(name: &str) -> Result<&str, CodecError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(CodecError::InvalidArchive(format!(
            "illegal file name in record: {name:?}"
        )));
    }
    Ok(name)
}

fn write_archive(staging: &Path, dest: &Path, record: &ArchiveRecord) -> Result<(), CodecError> {
    let result = stage_and_compress(staging, dest, record);
    if staging.exists() {
        if let Err(e) = fs::remove_dir_all(staging) {
            tracing::warn!(path = %staging.display(), error = %e, "failed to remove staging dir");
        }
    }
    result
}

fn stage_and_compress(staging: &Path, dest: &Path, record: &ArchiveRecord) -> Result<(), CodecError> {
    let assets_dir = staging.join(ASSETS_DIR);
    fs::create_dir_all(&assets_dir).map_err(|e| CodecError::io_error(&assets_dir, e))?;

    // Names are unique per source path, so a repeated name is the same file
    // (a created manifest is listed both as manifest and as asset)
    let mut copied = HashSet::new();
    let sources = record
        .manifests
        .iter()
        .map(|m| (m.archive_name(), &m.path))
        .chain(record.assets.iter().map(|a| (a.archive_name(), &a.path)));
    for (name, source) in sources {
        if !copied.insert(name) {
            continue;
        }
        let source = Path::new(source);
        if !source.is_file() {
            return Err(CodecError::AssetMissing(source.to_path_buf()));
        }
        let target = assets_dir.join(checked_member(name)?);
        fs::copy(source, &target).map_err(|e| CodecError::io_error(source, e))?;
    }

    let manifest_path = staging.join(MANIFEST_FILE);
    let json = serde_json::to_vec_pretty(record)?;
    fs::write(&manifest_path, json).map_err(|e| CodecError::io_error(&manifest_path, e))?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CodecError::io_error(parent, e))?;
    }

    // Compress next to the target, then move into place
    let partial = dest.with_extension("pocf.partial");
    sevenz_rust2::compress_to_path(staging, &partial)
        .map_err(|e| CodecError::Archive(format!("failed to compress archive: {e}")))?;
    fs::rename(&partial, dest).map_err(|e| {
        let _ = fs::remove_file(&partial);
        CodecError::io_error(dest, e)
    })?;

    tracing::debug!(staging = %staging.display(), files = copied.len(), "archive staged");
    Ok(())
}

fn read_archive(src: &Path, extract_dir: &Path) -> Result<ArchiveRecord, CodecError> {
    if !src.is_file() {
        return Err(CodecError::io_error(
            src,
            std::io::Error::new(std::io::ErrorKind::NotFound, "archive not found"),
        ));
    }
    fs::create_dir_all(extract_dir).map_err(|e| CodecError::io_error(extract_dir, e))?;

    let result = extract_record(src, extract_dir);
    if result.is_err() {
        let _ = fs::remove_dir_all(extract_dir);
    }
    result
}

fn extract_record(src: &Path, extract_dir: &Path) -> Result<ArchiveRecord, CodecError> {
    sevenz_rust2::decompress_file(src, extract_dir)
        .map_err(|e| CodecError::Archive(format!("failed to extract archive: {e}")))?;

    let manifest_path = extract_dir.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Err(CodecError::InvalidArchive(format!("{MANIFEST_FILE} not found")));
    }
    let bytes = fs::read(&manifest_path).map_err(|e| CodecError::io_error(&manifest_path, e))?;
    let mut record: ArchiveRecord = serde_json::from_slice(&bytes)?;

    if !record.has_files() {
        return Err(CodecError::InvalidArchive(
            "record has no manifests or assets".to_string(),
        ));
    }

    let assets_dir = extract_dir.join(ASSETS_DIR);
    let extracted = |name: &str| -> Result<String, CodecError> {
        Ok(assets_dir.join(checked_member(name)?).to_string_lossy().into_owned())
    };
    for manifest in &mut record.manifests {
        manifest.path = extracted(manifest.archive_name())?;
    }
    for asset in &mut record.assets {
        asset.path = extracted(asset.archive_name())?;
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AssetEntry, FobRecord, ManifestEntry, DEFAULT_SCHEMA_VERSION};
    use chrono::NaiveDate;
    use pocf_model::{AssetKind, TemplateField};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn codec(root: &Path) -> SevenZipArchiveCodec {
        SevenZipArchiveCodec::new(root.join("loaded"), root.join("manifests"))
            .with_staging_root(root.join("staging"))
    }

    fn record_with(manifest_path: &Path) -> ArchiveRecord {
        let mut mappings = BTreeMap::new();
        mappings.insert("item_number".to_string(), "SKU".to_string());
        ArchiveRecord {
            version: DEFAULT_SCHEMA_VERSION.to_string(),
            po_number: 42,
            buyer_id: "07".into(),
            vendor: "Acme".into(),
            creation_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expected_delivery_date: None,
            cancel_date: None,
            description: "Spring".into(),
            terms: "Net 30".into(),
            ship_to_address: String::new(),
            notes: String::new(),
            shipping_notes: String::new(),
            fob: FobRecord::default(),
            manifests: vec![ManifestEntry::new(
                "vendor.csv",
                manifest_path.to_string_lossy(),
                mappings,
            )],
            assets: vec![AssetEntry::new(
                "vendor.csv",
                manifest_path.to_string_lossy(),
                AssetKind::Manifest,
            )],
        }
    }

    #[tokio::test]
    async fn write_then_read_rewrites_paths() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("vendor.csv");
        fs::write(&source, "SKU,Desc\n1,one\n").unwrap();
        let codec = codec(dir.path());
        let target = dir.path().join("out").join("order.pocf");

        let record = record_with(&source);
        codec.write(&target, &record).await.unwrap();
        assert!(target.is_file());
        assert!(!dir.path().join("staging").read_dir().unwrap().any(|_| true));

        let loaded = codec.read(&target).await.unwrap();
        let extracted = PathBuf::from(&loaded.manifests[0].path);
        assert!(extracted.starts_with(codec.extract_root()));
        assert_eq!(fs::read_to_string(&extracted).unwrap(), "SKU,Desc\n1,one\n");
        assert_eq!(loaded.assets[0].path, loaded.manifests[0].path);

        let expected = ArchiveRecord {
            manifests: loaded.manifests.clone(),
            assets: loaded.assets.clone(),
            ..record
        };
        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn same_named_files_from_different_folders_stay_apart() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a").join("vendor.csv");
        let second = dir.path().join("b").join("vendor.csv");
        for (path, body) in [(&first, "SKU\n1\n"), (&second, "ITEM\n2\n")] {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }

        let mut record = record_with(&first);
        let mut mappings = BTreeMap::new();
        mappings.insert("item_number".to_string(), "ITEM".to_string());
        record.manifests.push(ManifestEntry::new(
            "vendor.csv",
            second.to_string_lossy(),
            mappings,
        ));
        record.assets.push(AssetEntry::new(
            "VENDOR.csv",
            second.to_string_lossy(),
            AssetKind::Manifest,
        ));

        let codec = codec(dir.path());
        let target = dir.path().join("order.pocf");
        codec.write(&target, &record).await.unwrap();
        let loaded = codec.read(&target).await.unwrap();

        assert_eq!(loaded.manifests[0].stored_name, None);
        assert_eq!(loaded.manifests[1].stored_name.as_deref(), Some("1_vendor.csv"));
        assert_eq!(loaded.manifests[1].filename, "vendor.csv");
        assert_ne!(loaded.manifests[0].path, loaded.manifests[1].path);
        assert_eq!(loaded.assets[1].path, loaded.manifests[1].path);

        assert_eq!(fs::read_to_string(&loaded.manifests[0].path).unwrap(), "SKU\n1\n");
        assert_eq!(fs::read_to_string(&loaded.manifests[1].path).unwrap(), "ITEM\n2\n");
        assert_eq!(loaded.manifests[1].mappings["item_number"], "ITEM");
    }

    #[tokio::test]
    async fn names_escaping_the_assets_dir_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let packed = dir.path().join("packed");
        fs::create_dir_all(packed.join(ASSETS_DIR)).unwrap();
        fs::write(packed.join(ASSETS_DIR).join("vendor.csv"), "SKU\n").unwrap();
        let mut record = record_with(&dir.path().join("vendor.csv"));
        record.assets[0].stored_name = Some("../escape.csv".into());
        fs::write(
            packed.join(MANIFEST_FILE),
            serde_json::to_vec(&record).unwrap(),
        )
        .unwrap();
        let target = dir.path().join("crafted.pocf");
        sevenz_rust2::compress_to_path(&packed, &target).unwrap();

        let err = codec(dir.path()).read(&target).await.unwrap_err();
        assert!(matches!(err, CodecError::InvalidArchive(ref msg) if msg.contains("escape.csv")));
    }

    #[test]
    fn stored_names_follow_source_paths() {
        let mut record = record_with(Path::new("/a/vendor.csv"));
        record.assets.push(AssetEntry::new("vendor.csv", "/b/vendor.csv", AssetKind::Asset));
        record.assets.push(AssetEntry::new("1_vendor.csv", "/c/1_vendor.csv", AssetKind::Asset));

        assign_stored_names(&mut record);
        let names: Vec<_> = record.assets.iter().map(AssetEntry::archive_name).collect();
        assert_eq!(names, vec!["vendor.csv", "1_vendor.csv", "1_1_vendor.csv"]);
        assert_eq!(record.manifests[0].archive_name(), "vendor.csv");
    }

    #[tokio::test]
    async fn missing_asset_fails_write_and_leaves_target_absent() {
        let dir = tempfile::tempdir().unwrap();
        let codec = codec(dir.path());
        let target = dir.path().join("order.pocf");

        let record = record_with(&dir.path().join("gone.csv"));
        let err = codec.write(&target, &record).await.unwrap_err();
        assert!(matches!(err, CodecError::AssetMissing(_)));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn reading_non_archive_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pocf");
        fs::write(&path, b"plain text, not 7z").unwrap();

        let err = codec(dir.path()).read(&path).await.unwrap_err();
        assert!(matches!(err, CodecError::Archive(_)));
    }

    #[tokio::test]
    async fn reading_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = codec(dir.path())
            .read(&dir.path().join("absent.pocf"))
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Io { .. }));
    }

    #[tokio::test]
    async fn write_csv_lands_in_csv_dir() {
        let dir = tempfile::tempdir().unwrap();
        let codec = codec(dir.path());
        let rows = vec![ManifestRow::new().with(TemplateField::ItemNumber, "X")];

        let path = codec.write_csv(&rows, "created_manifest_1.csv").await.unwrap();
        assert_eq!(path, dir.path().join("manifests").join("created_manifest_1.csv"));
        assert!(fs::read_to_string(&path).unwrap().starts_with("Item Number,"));
    }
}
