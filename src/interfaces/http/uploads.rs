use super::state::UploadSettings;
use crate::domain::error::{AppError, Result};
use crate::domain::import::RawRow;
use crate::infrastructure::spreadsheet::SpreadsheetKind;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::MultipartForm;
use actix_web::web;
use tracing::{info, warn};

#[derive(MultipartForm)]
pub struct UploadForm {
    #[multipart(limit = "10MiB")]
    pub file: TempFile,
}

/// Checks, parses and then discards an uploaded spreadsheet.
pub async fn read_upload(form: UploadForm, settings: &UploadSettings) -> Result<Vec<RawRow>> {
    let file = form.file;
    let rows = parse_upload(&file, settings).await;
    discard(file);
    rows
}

async fn parse_upload(file: &TempFile, settings: &UploadSettings) -> Result<Vec<RawRow>> {
    let file_name = file.file_name.clone().unwrap_or_default();
    let content_type = file.content_type.as_ref().map(|mime| mime.essence_str());
    let kind = SpreadsheetKind::detect(&file_name, content_type)?;

    if file.size > settings.max_file_size_bytes {
        return Err(AppError::ValidationError(format!(
            "File is too large: {} bytes (limit {} bytes)",
            file.size, settings.max_file_size_bytes
        )));
    }

    let path = file.file.path().to_path_buf();
    let rows = web::block(move || kind.read_rows(&path))
        .await
        .map_err(|e| AppError::Internal(format!("Spreadsheet parser failed: {}", e)))??;
    info!(file = %file_name, rows = rows.len(), "Parsed uploaded spreadsheet");
    Ok(rows)
}

fn discard(file: TempFile) {
    let path = file.file.path().to_path_buf();
    if let Err(err) = file.file.close() {
        warn!(error = %err, path = %path.display(), "Failed to remove uploaded file");
    }
}
