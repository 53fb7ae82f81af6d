//! Users are identified by phone + email. No passwords, no OTP: the pair is the login.

pub mod handlers;
pub mod store;

use sha2::{Digest, Sha256};

const USER_ID_HEX_LEN: usize = 24;

/// Normalizes Kenyan phone numbers to `2547XXXXXXXX` / `2541XXXXXXXX`.
///
/// Everything but digits is dropped first, so `+254 7XX XXX XXX`, `07XX-XXX-XXX`
/// and `(07XX) XXX XXX` all land on the same value. Numbers that match no
/// known shape are returned as bare digits for the provider to validate.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == 10 && (digits.starts_with("07") || digits.starts_with("01")) {
        return format!("254{}", &digits[1..]);
    }

    if digits.len() == 9 && (digits.starts_with('7') || digits.starts_with('1')) {
        return format!("254{digits}");
    }

    digits
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Stable user id: the first 24 hex chars of SHA-256(`phone|email`), both normalized.
pub fn make_user_id(phone: &str, email: &str) -> String {
    let key = format!("{}|{}", normalize_phone(phone), normalize_email(email));
    let digest = Sha256::digest(key.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(USER_ID_HEX_LEN);
    id
}
