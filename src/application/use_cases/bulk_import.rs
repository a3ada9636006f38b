use crate::domain::error::Result;
use crate::domain::import::{ImportReport, ImportedRow, RawRow, SkippedRow};
use async_trait::async_trait;
use tracing::{info, warn};

/// Persists one spreadsheet row.
#[async_trait]
pub trait RowImporter: Send + Sync {
    /// Entity label used in logs ("lead", "vehicle").
    fn entity(&self) -> &'static str;

    /// Validates, mints an id and stores the row. Returns the minted id and a
    /// display name for the report.
    async fn import_row(&self, row: &RawRow) -> Result<(String, String)>;
}

/// Imports `rows` one after another. A failing row is recorded as skipped
/// and never aborts the rest of the batch. Blank rows are ignored but still
/// count toward the zero-based data row `index` reported back.
pub async fn import_rows<I>(importer: &I, rows: Vec<RawRow>) -> ImportReport
where
    I: RowImporter + ?Sized,
{
    let total = rows.iter().filter(|row| !row.is_empty()).count();
    let mut report = ImportReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        match importer.import_row(&row).await {
            Ok((id, name)) => report.successful.push(ImportedRow { index, id, name }),
            Err(err) => {
                warn!(
                    error = %err,
                    row_index = index,
                    entity = importer.entity(),
                    "Skipping spreadsheet row"
                );
                report.skipped.push(SkippedRow {
                    index,
                    reason: err.message().to_string(),
                    row,
                });
            }
        }
    }

    info!(
        entity = importer.entity(),
        total,
        successful = report.successful.len(),
        skipped = report.skipped.len(),
        "Bulk import finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use std::sync::Mutex;

    struct Recording {
        stored: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RowImporter for Recording {
        fn entity(&self) -> &'static str {
            "test"
        }

        async fn import_row(&self, row: &RawRow) -> Result<(String, String)> {
            let name = row.get("name").cloned().unwrap_or_default();
            if name == "bad" {
                return Err(AppError::ValidationError("name is bad".to_string()));
            }
            let mut stored = self.stored.lock().unwrap();
            stored.push(name.clone());
            Ok((format!("ID{}", stored.len()), name))
        }
    }

    fn rows(names: &[&str]) -> Vec<RawRow> {
        names
            .iter()
            .map(|name| RawRow::from([("name".to_string(), name.to_string())]))
            .collect()
    }

    #[tokio::test]
    async fn test_failing_row_is_skipped_and_rest_continue() {
        let importer = Recording {
            stored: Mutex::new(Vec::new()),
        };
        let report = import_rows(&importer, rows(&["a", "b", "bad", "d", "e"])).await;

        assert_eq!(report.successful.len(), 4);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 2);
        assert_eq!(report.skipped[0].reason, "name is bad");
        assert_eq!(report.skipped[0].row["name"], "bad");

        let indexes: Vec<usize> = report.successful.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 3, 4]);
        assert_eq!(report.successful[3].id, "ID4");
    }

    #[tokio::test]
    async fn test_blank_rows_keep_sheet_positions() {
        let importer = Recording {
            stored: Mutex::new(Vec::new()),
        };
        let mut sheet = rows(&["a", "bad"]);
        sheet.insert(1, RawRow::new());
        let report = import_rows(&importer, sheet).await;

        assert_eq!(report.successful.len(), 1);
        assert_eq!(report.successful[0].index, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 2);
    }

    #[tokio::test]
    async fn test_empty_sheet() {
        let importer = Recording {
            stored: Mutex::new(Vec::new()),
        };
        let report = import_rows(&importer, Vec::new()).await;
        assert_eq!(report, ImportReport::default());
    }
}
