//! Excel workbook reader (first sheet only)

use super::FormatReader;
use crate::error::ParseError;
use calamine::{open_workbook_auto, Data, Reader};
use pocf_model::ParsedManifest;
use std::path::Path;

/// Reads `.xlsx`, `.xls`, `.xlsm` and `.xlsb` workbooks
///
/// The first row of the first sheet is the header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelReader;

impl FormatReader for ExcelReader {
    fn read(&self, path: &Path, preview_rows: usize) -> Result<ParsedManifest, ParseError> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| ParseError::malformed(path, format!("failed to open Excel file: {e}")))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ParseError::malformed(path, "Excel file has no sheets"))?;

        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            ParseError::malformed(path, format!("failed to read sheet '{sheet_name}': {e}"))
        })?;

        let mut rows_iter = range.rows();
        let header = rows_iter
            .next()
            .ok_or_else(|| ParseError::Empty(path.to_path_buf()))?;
        let columns: Vec<String> = header.iter().map(cell_to_string).collect();
        if columns.is_empty() {
            return Err(ParseError::Empty(path.to_path_buf()));
        }

        let rows = rows_iter
            .take(preview_rows)
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(ParsedManifest {
            columns,
            rows,
            total_rows: range.height().saturating_sub(1),
        })
    }

    fn extensions(&self) -> &[&str] {
        &["xlsx", "xls", "xlsm", "xlsb"]
    }
}

/// Render a cell the way a user would read it in the sheet
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Whole numbers lose the trailing ".0" (item numbers, UPCs)
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERROR: {e:?}"),
        other => other.to_string(),
    }
}
