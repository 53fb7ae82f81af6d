//! Axum route handler for gated document downloads.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::career::outputs::load_user_output;
use crate::errors::AppError;
use crate::export::{export, Document, ExportFormat};
use crate::payments::unlock::require_paid;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub format: Option<String>,
}

/// GET /api/v1/users/:user_id/outputs/:document/download?format=md|docx|pdf
///
/// Premium only: unpaid users get 402 with the WhatsApp payment link.
pub async fn handle_download(
    State(state): State<AppState>,
    Path((user_id, document)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let document: Document = document.parse()?;
    let format = match query.format.as_deref() {
        Some(format) => format.parse::<ExportFormat>()?,
        None => ExportFormat::Markdown,
    };

    require_paid(
        &state.db,
        &user_id,
        &state.config.whatsapp_number,
        state.config.premium_amount_kes,
    )
    .await?;

    let saved = load_user_output(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No saved outputs. Generate first.".to_string()))?;
    let text = match document {
        Document::Resume => saved.resume_markdown,
        Document::CoverLetter => saved.cover_letter,
    };
    if text.trim().is_empty() {
        return Err(AppError::NotFound(format!(
            "No saved {} yet. Generate first.",
            document.title().to_lowercase()
        )));
    }

    let bytes = tokio::task::spawn_blocking(move || export(format, document.title(), &text))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))??;

    info!(
        "Exported {} for user {user_id} ({} bytes)",
        document.filename(format),
        bytes.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename(format)),
            ),
        ],
        bytes,
    )
        .into_response())
}
