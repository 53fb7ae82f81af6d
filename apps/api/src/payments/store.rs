//! Payment records.
//!
//! INVARIANT: `transaction_reference` is unique and a record's status only
//! ever moves `pending -> completed` or `pending -> failed`. Every status
//! write is a conditional UPDATE guarded by `status = 'pending'`, so replayed
//! or out-of-order callbacks cannot move a finished payment.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::models::payment::{Payment, PaymentStatus};
use crate::users::normalize_phone;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
const MANUAL_PHONE: &str = "WHATSAPP";

/// Outcome of an attempted status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    AlreadyFinal(PaymentStatus),
    NotFound,
}

/// Records a new pending payment. Returns `false` for a duplicate reference,
/// a non-positive amount, or blank identifiers. Existing rows are never overwritten.
pub async fn create_payment(
    pool: &SqlitePool,
    user_id: &str,
    phone: &str,
    reference: &str,
    amount: i64,
) -> Result<bool, sqlx::Error> {
    let phone = normalize_phone(phone);
    if user_id.trim().is_empty() || phone.is_empty() || reference.trim().is_empty() || amount <= 0
    {
        warn!("Refusing to record payment with missing fields (reference={reference:?})");
        return Ok(false);
    }

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO payments
            (transaction_reference, user_id, phone_number, amount, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, 'pending', ?, ?)
        "#,
    )
    .bind(reference)
    .bind(user_id)
    .bind(&phone)
    .bind(amount)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let created = result.rows_affected() > 0;
    if created {
        info!("Recorded pending payment {reference} for user {user_id} (KES {amount})");
    } else {
        warn!("Payment {reference} already exists, not overwritten");
    }
    Ok(created)
}

pub async fn get_payment(
    pool: &SqlitePool,
    reference: &str,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE transaction_reference = ?")
        .bind(reference)
        .fetch_optional(pool)
        .await
}

pub async fn complete_payment(
    pool: &SqlitePool,
    reference: &str,
) -> Result<Transition, sqlx::Error> {
    finish_payment(pool, reference, PaymentStatus::Completed).await
}

pub async fn fail_payment(pool: &SqlitePool, reference: &str) -> Result<Transition, sqlx::Error> {
    finish_payment(pool, reference, PaymentStatus::Failed).await
}

async fn finish_payment(
    pool: &SqlitePool,
    reference: &str,
    target: PaymentStatus,
) -> Result<Transition, sqlx::Error> {
    debug_assert!(target.is_final());

    let now = Utc::now();
    let completed_at = (target == PaymentStatus::Completed).then_some(now);

    let result = sqlx::query(
        r#"
        UPDATE payments
        SET status = ?, updated_at = ?, completed_at = ?
        WHERE transaction_reference = ? AND status = 'pending'
        "#,
    )
    .bind(target.as_str())
    .bind(now)
    .bind(completed_at)
    .bind(reference)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!("Payment {reference} marked {target}");
        return Ok(Transition::Applied);
    }

    Ok(match get_payment(pool, reference).await? {
        Some(payment) => {
            info!(
                "Payment {reference} already {}, ignoring transition to {target}",
                payment.status
            );
            Transition::AlreadyFinal(payment.status)
        }
        None => {
            warn!("Payment {reference} not found");
            Transition::NotFound
        }
    })
}

/// Whether the user has at least one completed payment.
pub async fn is_user_paid(pool: &SqlitePool, user_id: &str) -> Result<bool, sqlx::Error> {
    if user_id.is_empty() {
        return Ok(false);
    }
    let paid: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM payments WHERE user_id = ? AND status = 'completed' LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(paid.is_some())
}

/// Manual admin unlock (payment confirmed out of band, e.g. over WhatsApp).
///
/// Completes every pending payment of the user. If there were none, records a
/// synthetic completed payment so the unlock is still auditable.
pub async fn mark_user_paid(
    pool: &SqlitePool,
    user_id: &str,
    amount: i64,
) -> Result<Transition, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE payments
        SET status = 'completed', updated_at = ?, completed_at = ?
        WHERE user_id = ? AND status = 'pending'
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(user_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        let reference = format!("manual-whatsapp-{user_id}-{}", now.timestamp());
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO payments
                (transaction_reference, user_id, phone_number, amount, status,
                 created_at, updated_at, completed_at)
            VALUES (?, ?, ?, ?, 'completed', ?, ?, ?)
            "#,
        )
        .bind(&reference)
        .bind(user_id)
        .bind(MANUAL_PHONE)
        .bind(amount)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        info!("Manual unlock for user {user_id} recorded as {reference}");
    } else {
        info!("Manual unlock completed {updated} pending payment(s) for user {user_id}");
    }

    tx.commit().await?;
    Ok(Transition::Applied)
}

/// Newest first, at most `limit` rows, optionally for a single user.
pub async fn list_payments(
    pool: &SqlitePool,
    user_id: Option<&str>,
    limit: i64,
) -> Result<Vec<Payment>, sqlx::Error> {
    match user_id {
        Some(user_id) => {
            sqlx::query_as::<_, Payment>(
                "SELECT * FROM payments WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(user_id)
            .bind(limit.max(1))
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Payment>(
                "SELECT * FROM payments ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(limit.max(1))
            .fetch_all(pool)
            .await
        }
    }
}
