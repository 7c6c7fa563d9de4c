//! CSV manifest reader

use super::FormatReader;
use crate::error::ParseError;
use pocf_model::ParsedManifest;
use std::path::Path;

/// Reads comma-separated manifests; ragged rows are tolerated
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReader;

impl FormatReader for CsvReader {
    fn read(&self, path: &Path, preview_rows: usize) -> Result<ParsedManifest, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| ParseError::malformed(path, format!("failed to open CSV file: {e}")))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| ParseError::malformed(path, format!("failed to read CSV headers: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        if columns.is_empty() {
            return Err(ParseError::Empty(path.to_path_buf()));
        }

        let mut rows = Vec::new();
        let mut total_rows = 0;
        for result in reader.records() {
            total_rows += 1;
            if rows.len() < preview_rows {
                let record = result.map_err(|e| {
                    ParseError::malformed(path, format!("failed to read CSV row: {e}"))
                })?;
                rows.push(record.iter().map(str::to_string).collect());
            }
        }

        Ok(ParsedManifest {
            columns,
            rows,
            total_rows,
        })
    }

    fn extensions(&self) -> &[&str] {
        &["csv"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_headers_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "m.csv", "SKU,Description\nA1,Widget\nA2,Gadget\nA3,Doohickey\n");

        let parsed = CsvReader.read(&path, 2).unwrap();
        assert_eq!(parsed.columns, vec!["SKU", "Description"]);
        assert_eq!(parsed.rows, vec![vec!["A1", "Widget"], vec!["A2", "Gadget"]]);
        assert_eq!(parsed.total_rows, 3);
    }

    #[test]
    fn tolerates_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "r.csv", "a,b,c\n1,2\n1,2,3,4\n");

        let parsed = CsvReader.read(&path, 10).unwrap();
        assert_eq!(parsed.rows[0].len(), 2);
        assert_eq!(parsed.rows[1].len(), 4);
    }

    #[test]
    fn empty_file_has_no_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "e.csv", "");

        let err = CsvReader.read(&path, 10).unwrap_err();
        assert!(matches!(err, ParseError::Empty(_)));
    }

    #[test]
    fn header_only_file_has_zero_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "h.csv", "x,y\n");

        let parsed = CsvReader.read(&path, 10).unwrap();
        assert_eq!(parsed.total_rows, 0);
        assert!(parsed.rows.is_empty());
    }
}
