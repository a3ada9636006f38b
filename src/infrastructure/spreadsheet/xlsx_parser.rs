use crate::domain::error::{AppError, Result};
use crate::domain::import::RawRow;
use calamine::{open_workbook, Data, DataType, ExcelDateTime, Range, Reader, Xlsx};
use chrono::NaiveDate;
use std::path::Path;

/// Reads the first worksheet of an `.xlsx` workbook. The first row holds the
/// headers; date cells are rendered as `YYYY-MM-DD`. Blank rows are kept as
/// empty maps so that row positions survive.
pub fn parse_xlsx_file(path: &Path) -> Result<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| AppError::ParseError(format!("Failed to open Excel file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
        .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?;

    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => return Vec::new(),
    };

    rows.map(|row| {
        headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .filter_map(|(header, cell)| {
                let value = cell_text(cell);
                (!value.is_empty()).then(|| (header.clone(), value))
            })
            .collect::<RawRow>()
    })
    .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(value) => excel_date_text(value),
        // ISO cells may carry a time part; keep the date when there is one.
        Data::DateTimeIso(raw) => raw
            .get(..10)
            .filter(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok())
            .unwrap_or(raw.as_str())
            .to_string(),
        _ => cell
            .as_string()
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| format!("{}", cell).trim().to_string()),
    }
}

/// Dates become `YYYY-MM-DD` (calamine applies the workbook's 1900 or 1904
/// epoch); durations become `H:MM:SS`.
fn excel_date_text(value: &ExcelDateTime) -> String {
    if value.is_duration() {
        return value
            .as_duration()
            .map(|duration| {
                let seconds = duration.num_seconds();
                format!(
                    "{}:{:02}:{:02}",
                    seconds / 3600,
                    (seconds % 3600) / 60,
                    seconds % 60
                )
            })
            .unwrap_or_default();
    }
    value
        .as_datetime()
        .map(|datetime| datetime.date().format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::ExcelDateTimeType;

    #[test]
    fn test_date_cells_use_workbook_epoch() {
        let modern = ExcelDateTime::new(45_292.75, ExcelDateTimeType::DateTime, false);
        assert_eq!(excel_date_text(&modern), "2024-01-01");

        // 1904 workbooks count from 1904-01-01, 1462 days later.
        let legacy = ExcelDateTime::new(43_830.0, ExcelDateTimeType::DateTime, true);
        assert_eq!(excel_date_text(&legacy), "2024-01-01");
    }

    #[test]
    fn test_duration_cells_are_not_dates() {
        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(excel_date_text(&duration), "36:00:00");
    }

    #[test]
    fn test_rows_from_range() {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("Name".to_string()));
        range.set_value((0, 1), Data::String("Phone Number".to_string()));
        range.set_value((0, 2), Data::String("Next Follow Up".to_string()));
        range.set_value((1, 0), Data::String(" Ada ".to_string()));
        range.set_value((1, 1), Data::Float(4035550199.0));
        range.set_value(
            (1, 2),
            Data::DateTime(ExcelDateTime::new(45_292.0, ExcelDateTimeType::DateTime, false)),
        );
        range.set_value((3, 0), Data::String("Grace".to_string()));
        range.set_value((3, 2), Data::DateTimeIso("2024-02-03T10:00:00".to_string()));

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Name"], "Ada");
        assert_eq!(rows[0]["Phone Number"], "4035550199");
        assert_eq!(rows[0]["Next Follow Up"], "2024-01-01");
        assert!(rows[1].is_empty());
        assert_eq!(rows[2]["Next Follow Up"], "2024-02-03");
    }
}
