//! Admin surface: user lookup, manual unlocks, payment audit, LLM connectivity.
//!
//! Every admin route requires the `x-admin-password` header. With no
//! ADMIN_PASSWORD configured the whole surface answers 403.

pub mod handlers;

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::Config;
use crate::errors::AppError;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

type HmacSha256 = Hmac<Sha256>;

const PASSWORD_MAC_KEY: &[u8] = b"career-api-admin-password";

pub fn require_admin(headers: &HeaderMap, config: &Config) -> Result<(), AppError> {
    let Some(expected) = config.admin_password.as_deref() else {
        return Err(AppError::Forbidden(
            "Admin access is disabled. Set ADMIN_PASSWORD to enable it.".to_string(),
        ));
    };

    let supplied = headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if !passwords_match(supplied, expected) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn password_mac(password: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(PASSWORD_MAC_KEY).ok()?;
    mac.update(password.as_bytes());
    Some(mac)
}

/// Both passwords are MAC'd to fixed-length tags and compared with
/// `verify_slice`, which is constant-time.
fn passwords_match(supplied: &str, expected: &str) -> bool {
    let (Some(supplied), Some(expected)) = (password_mac(supplied), password_mac(expected)) else {
        return false;
    };
    supplied
        .verify_slice(&expected.finalize().into_bytes())
        .is_ok()
}
