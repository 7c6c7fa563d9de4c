//! PDF manifest reader
//!
//! Vendor price lists are sometimes only available as PDF. The text layer is
//! extracted with `pdf-extract` and read back as a table: the first non-blank
//! line is the header, and the column separator is guessed from it.

use super::FormatReader;
use crate::error::ParseError;
use pocf_model::ParsedManifest;
use std::path::Path;

/// Reads the text layer of a PDF as a table
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl FormatReader for PdfReader {
    fn read(&self, path: &Path, preview_rows: usize) -> Result<ParsedManifest, ParseError> {
        let text = pdf_extract::extract_text(path).map_err(|e| {
            ParseError::malformed(path, format!("failed to extract text from PDF: {e}"))
        })?;
        table_from_text(&text, preview_rows).ok_or_else(|| ParseError::Empty(path.to_path_buf()))
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

/// How cells are separated on a line of extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Char(char),
    /// Two or more spaces
    Gap,
}

impl Separator {
    fn detect(header: &str) -> Self {
        ['\t', '|', ',']
            .into_iter()
            .find(|c| header.contains(*c))
            .map_or(Self::Gap, Self::Char)
    }

    fn split(self, line: &str) -> Vec<String> {
        match self {
            Self::Char('|') => line
                .trim()
                .trim_matches('|')
                .split('|')
                .map(|cell| cell.trim().to_string())
                .collect(),
            Self::Char(c) => line.split(c).map(|cell| cell.trim().to_string()).collect(),
            Self::Gap => line
                .split("  ")
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Interpret extracted text as a table
///
/// With a character separator, preview rows whose cell count differs from
/// the header are left out (they are usually page headers or wrapped
/// lines); every non-blank line still counts towards `total_rows`. Returns
/// `None` when there is no header.
fn table_from_text(text: &str, preview_rows: usize) -> Option<ParsedManifest> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next()?;
    let separator = Separator::detect(header);

    let columns: Vec<String> = separator
        .split(header)
        .into_iter()
        .filter(|cell| !cell.is_empty())
        .collect();
    if columns.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    let mut total_rows = 0;
    for line in lines {
        total_rows += 1;
        if rows.len() >= preview_rows {
            continue;
        }
        let cells = separator.split(line);
        let fits = match separator {
            Separator::Gap => !cells.is_empty(),
            Separator::Char(_) => cells.len() == columns.len(),
        };
        if fits {
            rows.push(cells);
        }
    }

    Some(ParsedManifest {
        columns,
        rows,
        total_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_is_guessed_from_header() {
        assert_eq!(Separator::detect("SKU\tDesc"), Separator::Char('\t'));
        assert_eq!(Separator::detect("| SKU | Desc |"), Separator::Char('|'));
        assert_eq!(Separator::detect("SKU,Desc"), Separator::Char(','));
        assert_eq!(Separator::detect("SKU    Desc"), Separator::Gap);
    }

    #[test]
    fn tab_table_skips_misshapen_rows() {
        let text = "SKU\tDesc\tDept\nA1\tWidget\t7\nPage 2\nA2\tGadget\t8\n";
        let parsed = table_from_text(text, 10).unwrap();
        assert_eq!(parsed.columns, vec!["SKU", "Desc", "Dept"]);
        assert_eq!(
            parsed.rows,
            vec![vec!["A1", "Widget", "7"], vec!["A2", "Gadget", "8"]]
        );
        assert_eq!(parsed.total_rows, 3);
    }

    #[test]
    fn pipe_table_ignores_outer_bars() {
        let text = "| SKU | Desc |\n| A1 | Widget |\n";
        let parsed = table_from_text(text, 10).unwrap();
        assert_eq!(parsed.columns, vec!["SKU", "Desc"]);
        assert_eq!(parsed.rows, vec![vec!["A1", "Widget"]]);
    }

    #[test]
    fn space_aligned_columns() {
        let text = "\n\nItem No    Description      Dept\n1001       Canvas tote      12\n1002   Gloves   14\n";
        let parsed = table_from_text(text, 1).unwrap();
        assert_eq!(parsed.columns, vec!["Item No", "Description", "Dept"]);
        assert_eq!(parsed.rows, vec![vec!["1001", "Canvas tote", "12"]]);
        assert_eq!(parsed.total_rows, 2);
    }

    #[test]
    fn blank_text_has_no_table() {
        assert!(table_from_text("  \n\n", 10).is_none());
        assert!(table_from_text(",,\nA,B\n", 10).is_none());
    }

    #[test]
    fn non_pdf_bytes_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = PdfReader.read(&path, 10).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }
}
