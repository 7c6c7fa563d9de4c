//! Document ↔ archive record translation

use crate::document::Document;
use pocf_codec::{ArchiveRecord, AssetEntry, FobRecord, ManifestEntry};
use pocf_model::{AssetKind, AttachedFile, FieldMapping, PurchaseOrderHeader, TemplateField};
use std::collections::BTreeMap;

/// Side CSV produced for the in-app rows during a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreatedManifestFile {
    pub(crate) filename: String,
    pub(crate) path: String,
}

/// Assemble the record for `document`
///
/// A created-manifest CSV is listed both as a manifest (identity mapping)
/// and as an asset of kind manifest.
pub(crate) fn build_record(
    document: &Document,
    version: &str,
    created: Option<&CreatedManifestFile>,
) -> ArchiveRecord {
    let header = document.header();

    let mut manifests: Vec<ManifestEntry> = document
        .mappings()
        .iter()
        .map(|m| ManifestEntry::new(m.filename(), m.path(), encode_mapping(m.mappings())))
        .collect();

    let mut assets: Vec<AssetEntry> = document
        .files()
        .iter()
        .map(|f| AssetEntry::new(&f.filename, &f.path, f.asset_kind))
        .collect();

    if let Some(created) = created {
        manifests.push(ManifestEntry::new(
            &created.filename,
            &created.path,
            encode_mapping(&TemplateField::identity_mapping()),
        ));
        assets.push(AssetEntry::new(
            &created.filename,
            &created.path,
            AssetKind::Manifest,
        ));
    }

    ArchiveRecord {
        version: version.to_string(),
        po_number: header.po_number,
        buyer_id: header.buyer_id.clone(),
        vendor: header.vendor_name.clone(),
        creation_date: header.order_date,
        expected_delivery_date: header.ship_date,
        cancel_date: header.cancel_date,
        description: header.description.clone(),
        terms: header.terms.clone(),
        ship_to_address: header.ship_to_address.clone(),
        notes: header.notes.clone(),
        shipping_notes: header.shipping_notes.clone(),
        fob: FobRecord {
            fob_type: header.fob_type,
            point: header.fob_point.clone(),
        },
        manifests,
        assets,
    }
}

/// Rebuild a document from a record read back from disk
///
/// Mappings under unknown field keys, or for paths with no attached
/// manifest, are dropped with a warning. No parse is started.
pub(crate) fn document_from_record(record: ArchiveRecord) -> Document {
    let header = PurchaseOrderHeader {
        po_number: record.po_number,
        buyer_id: record.buyer_id,
        vendor_name: record.vendor,
        order_date: record.creation_date,
        ship_date: record.expected_delivery_date,
        cancel_date: record.cancel_date,
        description: record.description,
        terms: record.terms,
        ship_to_address: record.ship_to_address,
        notes: record.notes,
        shipping_notes: record.shipping_notes,
        fob_type: record.fob.fob_type,
        fob_point: record.fob.point,
    };

    let mut document = Document::new(header);
    document.attach_files(record.assets.into_iter().map(|asset| {
        let asset_kind = asset.kind();
        AttachedFile {
            key: asset.path.clone(),
            filename: asset.filename,
            path: asset.path,
            asset_kind,
        }
    }));

    for manifest in record.manifests {
        if !document.mappings().contains(&manifest.path) {
            tracing::warn!(
                path = %manifest.path,
                "saved mapping has no attached manifest; skipped"
            );
            continue;
        }
        let mappings = decode_mapping(&manifest.path, manifest.mappings);
        if let Err(e) = document.replace_mappings(&manifest.path, mappings) {
            tracing::warn!(path = %manifest.path, error = %e, "failed to restore mapping");
        }
    }

    document
}

fn encode_mapping(mappings: &FieldMapping) -> BTreeMap<String, String> {
    mappings
        .iter()
        .map(|(field, column)| (field.key().to_string(), column.clone()))
        .collect()
}

fn decode_mapping(path: &str, raw: BTreeMap<String, String>) -> FieldMapping {
    raw.into_iter()
        .filter_map(|(key, column)| match key.parse::<TemplateField>() {
            Ok(field) => Some((field, column)),
            Err(e) => {
                tracing::warn!(path, error = %e, "skipping saved mapping");
                None
            }
        })
        .collect()
}
