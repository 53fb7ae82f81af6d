use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::career::writer::FollowUpEmail;
use crate::models::output::UserOutputRow;

/// The last generated documents for a user, emails decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedOutput {
    pub resume_markdown: String,
    pub cover_letter: String,
    pub emails: Vec<FollowUpEmail>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserOutputRow> for SavedOutput {
    fn from(row: UserOutputRow) -> Self {
        let emails = serde_json::from_str(&row.emails_json).unwrap_or_else(|e| {
            warn!("Stored emails for {} are not valid JSON: {e}", row.user_id);
            Vec::new()
        });
        Self {
            resume_markdown: row.resume_markdown,
            cover_letter: row.cover_letter,
            emails,
            updated_at: row.updated_at,
        }
    }
}

/// Upserts the user's latest outputs. Returns false for a blank user id.
pub async fn save_user_output(
    pool: &SqlitePool,
    user_id: &str,
    resume_markdown: &str,
    cover_letter: &str,
    emails: &[FollowUpEmail],
) -> Result<bool, sqlx::Error> {
    if user_id.trim().is_empty() {
        return Ok(false);
    }

    let emails_json = serde_json::to_string(emails).unwrap_or_else(|_| "[]".to_string());
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO user_outputs (user_id, resume_markdown, cover_letter, emails_json, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT(user_id) DO UPDATE SET
            resume_markdown = excluded.resume_markdown,
            cover_letter    = excluded.cover_letter,
            emails_json     = excluded.emails_json,
            updated_at      = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(resume_markdown)
    .bind(cover_letter)
    .bind(emails_json)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(true)
}

pub async fn load_user_output(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<SavedOutput>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserOutputRow>("SELECT * FROM user_outputs WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(SavedOutput::from))
}
