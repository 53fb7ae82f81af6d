use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Last generated documents for a user. Emails are stored as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserOutputRow {
    pub user_id: String,
    pub resume_markdown: String,
    pub cover_letter: String,
    pub emails_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
