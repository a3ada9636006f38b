// ============================================================
// SPREADSHEET INFRASTRUCTURE LAYER
// ============================================================
// CSV and Excel readers for bulk uploads

mod csv_parser;
mod xlsx_parser;

pub use csv_parser::CsvParser;
pub use xlsx_parser::parse_xlsx_file;

use crate::domain::error::{AppError, Result};
use crate::domain::import::RawRow;
use std::path::Path;

pub const UNSUPPORTED_FILE_MESSAGE: &str =
    "Unsupported file type! Please upload a CSV or Excel file.";

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetKind {
    Csv,
    Xlsx,
}

impl SpreadsheetKind {
    /// Accepts a file only when both its extension and its declared content
    /// type agree on CSV or Excel.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let mime = content_type.unwrap_or_default().to_ascii_lowercase();

        let kind = match extension.as_deref() {
            Some("csv") if mime.contains("csv") => SpreadsheetKind::Csv,
            Some("xlsx") if mime == XLSX_MIME => SpreadsheetKind::Xlsx,
            _ => return Err(AppError::ValidationError(UNSUPPORTED_FILE_MESSAGE.to_string())),
        };
        Ok(kind)
    }

    /// Blocking read of the whole first sheet.
    pub fn read_rows(self, path: &Path) -> Result<Vec<RawRow>> {
        match self {
            SpreadsheetKind::Csv => CsvParser::parse_file_auto_detect(path),
            SpreadsheetKind::Xlsx => parse_xlsx_file(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            SpreadsheetKind::detect("Leads.CSV", Some("text/csv")).unwrap(),
            SpreadsheetKind::Csv
        );
        assert_eq!(
            SpreadsheetKind::detect("stock.xlsx", Some(XLSX_MIME)).unwrap(),
            SpreadsheetKind::Xlsx
        );
    }

    #[test]
    fn test_rejects_mismatched_uploads() {
        for (name, mime) in [
            ("leads.csv", Some("application/pdf")),
            ("leads.pdf", Some("text/csv")),
            ("leads.xls", Some("application/vnd.ms-excel")),
            ("leads", None),
        ] {
            let err = SpreadsheetKind::detect(name, mime).unwrap_err();
            assert_eq!(err.message(), UNSUPPORTED_FILE_MESSAGE);
        }
    }
}
