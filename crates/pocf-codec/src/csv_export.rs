//! Side CSV for the in-app item table

use crate::error::CodecError;
use pocf_model::{ManifestRow, TemplateField};
use std::path::Path;

/// Write `rows` to `dest` with the template labels as header
///
/// Columns follow template order; missing cells are written empty.
///
/// # Errors
/// Returns [`CodecError::Csv`] if the file cannot be created or written.
pub fn write_manifest_csv(rows: &[ManifestRow], dest: &Path) -> Result<(), CodecError> {
    let mut writer = csv::Writer::from_path(dest)?;
    writer.write_record(TemplateField::ALL.iter().map(|field| field.label()))?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer
        .flush()
        .map_err(|e| CodecError::io_error(dest, e))?;

    tracing::debug!(path = %dest.display(), rows = rows.len(), "wrote manifest csv");
    Ok(())
}
