//! Premium unlock helpers: the manual WhatsApp payment path and the download gate.

use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::payments::store::is_user_paid;
use crate::users::store::get_user;

/// Prefilled WhatsApp link the user taps to report a payment.
///
/// Only newlines and spaces are escaped; WhatsApp tolerates the rest.
pub fn whatsapp_link(number: &str, user_id: &str, phone: &str, email: &str, amount: i64) -> String {
    let message = format!(
        "Hi, I have paid KES {amount} for AI Career Accelerator.\n\
         User ID: {user_id}\nPhone: {phone}\nEmail: {email}\n\
         Please confirm and unlock my downloads."
    );
    let encoded = message.replace('\n', "%0A").replace(' ', "%20");
    format!("https://wa.me/{}?text={encoded}", number.trim())
}

/// Message the admin sends back once a payment is confirmed.
pub fn admin_unlock_message(user_id: &str, phone: &str, email: &str) -> String {
    format!(
        "Hi, I\u{2019}ve received payment for the AI Career Accelerator.\n\
         User ID: {user_id}\nPhone: {phone}\nEmail: {email}"
    )
}

/// Fails with 402 (carrying the WhatsApp link) unless the user has paid.
pub async fn require_paid(
    pool: &SqlitePool,
    user_id: &str,
    whatsapp_number: &str,
    amount: i64,
) -> Result<(), AppError> {
    if is_user_paid(pool, user_id).await? {
        return Ok(());
    }

    let user = get_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    Err(AppError::PaymentRequired {
        payment_link: whatsapp_link(whatsapp_number, user_id, &user.phone, &user.email, amount),
    })
}
