use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::user::User;
use crate::users::{make_user_id, normalize_email, normalize_phone};

const FIND_LIMIT: i64 = 50;

/// Fetches or creates the user for a phone + email pair.
///
/// Returns `None` when either value normalizes to empty.
pub async fn get_or_create_user(
    pool: &SqlitePool,
    phone: &str,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    let phone = normalize_phone(phone);
    let email = normalize_email(email);
    if phone.is_empty() || email.is_empty() {
        return Ok(None);
    }

    let user_id = make_user_id(&phone, &email);
    let now = Utc::now();

    let inserted = sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (user_id, phone, email, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user_id)
    .bind(&phone)
    .bind(&email)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    if inserted.rows_affected() > 0 {
        info!("Created user {user_id}");
    }

    get_user(pool, &user_id).await
}

pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Admin lookup by phone OR email. Blank criteria match nothing.
pub async fn find_users(
    pool: &SqlitePool,
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<Vec<User>, sqlx::Error> {
    let phone = phone.map(normalize_phone).filter(|p| !p.is_empty());
    let email = email.map(normalize_email).filter(|e| !e.is_empty());
    if phone.is_none() && email.is_none() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE (?1 IS NOT NULL AND phone = ?1) OR (?2 IS NOT NULL AND email = ?2)
        ORDER BY created_at DESC
        LIMIT ?3
        "#,
    )
    .bind(phone)
    .bind(email)
    .bind(FIND_LIMIT)
    .fetch_all(pool)
    .await
}
