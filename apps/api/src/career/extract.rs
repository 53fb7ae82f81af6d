//! Resume PDF text extraction.

use bytes::Bytes;
use tracing::warn;

use crate::errors::AppError;

/// Largest upload accepted by the extract endpoint.
pub const MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

/// Pulls plain text out of an uploaded PDF.
///
/// Runs on the blocking pool. A panic inside pdf-extract is reported as a bad upload.
pub async fn extract_text_from_pdf(data: Bytes) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("The uploaded file is empty.".to_string()));
    }

    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            warn!("PDF extraction panicked: {e}");
            AppError::Validation("Could not read this PDF. Paste resume text instead.".to_string())
        })?
        .map_err(|e| {
            warn!("PDF extraction failed: {e}");
            AppError::Validation("Could not read this PDF. Paste resume text instead.".to_string())
        })?;

    let text = tidy_text(&extracted);
    if text.is_empty() {
        return Err(AppError::Validation(
            "No text found in PDF. Paste resume text instead.".to_string(),
        ));
    }
    Ok(text)
}

/// Trims each line and collapses runs of blank lines to one.
fn tidy_text(raw: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() && out.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
