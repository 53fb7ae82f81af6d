//! IntaSend payment callbacks.
//!
//! Flow: verify signature on the raw body → parse JSON → classify state →
//! apply the (monotonic) status transition → acknowledge.

use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::payment::PaymentStatus;
use crate::payments::intasend::{non_empty, state_from_payload, ProviderState};
use crate::payments::store::{complete_payment, fail_payment, Transition};
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-intasend-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Verified,
    /// No secret configured (development mode).
    Skipped,
    Missing,
    Mismatch,
}

impl SignatureCheck {
    pub fn is_accepted(self) -> bool {
        matches!(self, SignatureCheck::Verified | SignatureCheck::Skipped)
    }
}

/// Checks a hex HMAC-SHA256 of the raw body. Comparison is constant-time and
/// case-insensitive in the hex digits.
pub fn verify_signature(
    secret: Option<&str>,
    payload: &[u8],
    signature: Option<&str>,
) -> SignatureCheck {
    let Some(secret) = secret else {
        warn!("INTASEND_API_KEY not set, skipping webhook signature verification (development mode)");
        return SignatureCheck::Skipped;
    };

    let Some(signature) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
        warn!("Webhook is missing the {SIGNATURE_HEADER} header");
        return SignatureCheck::Missing;
    };

    let Ok(expected) = hex::decode(signature) else {
        return SignatureCheck::Mismatch;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return SignatureCheck::Mismatch;
    };
    mac.update(payload);

    match mac.verify_slice(&expected) {
        Ok(()) => SignatureCheck::Verified,
        Err(_) => SignatureCheck::Mismatch,
    }
}

/// Hex HMAC-SHA256 signature for a payload.
#[cfg(test)]
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// First non-empty of `invoice_id` and `invoice` (string, number, or object).
fn reference_from_payload(payload: &Value) -> Option<String> {
    ["invoice_id", "invoice"]
        .iter()
        .find_map(|key| match payload.get(*key)? {
            Value::String(s) => non_empty(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(obj) => obj.get("invoice_id").and_then(Value::as_str).and_then(non_empty),
            _ => None,
        })
}

/// POST /intasend/webhook
pub async fn handle_intasend_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let check = verify_signature(state.config.intasend.api_key.as_deref(), &body, signature);
    if !check.is_accepted() {
        return Err(AppError::Forbidden("Invalid signature".to_string()));
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid payload: {e}")))?;

    let reference = reference_from_payload(&payload)
        .ok_or_else(|| AppError::Validation("Missing invoice_id".to_string()))?;
    let provider_state = state_from_payload(&payload);

    info!("Webhook received: invoice_id={reference}, state={provider_state}");

    let (transition, verb) = match ProviderState::classify(&provider_state) {
        ProviderState::Paid => (complete_payment(&state.db, &reference).await?, "paid"),
        ProviderState::Failed => (fail_payment(&state.db, &reference).await?, "failed"),
        // Acknowledge so the provider stops retrying.
        ProviderState::Pending => {
            return Ok(Json(json!({
                "ok": true,
                "ignored": true,
                "reason": format!("state={provider_state:?} not final"),
            })));
        }
    };

    match transition {
        Transition::Applied => Ok(Json(json!({
            "ok": true,
            "updated": true,
            "action": format!("payment_marked_{verb}"),
        }))),
        Transition::AlreadyFinal(status) => Ok(Json(json!({
            "ok": true,
            "updated": false,
            "action": already_action(status),
        }))),
        Transition::NotFound => Err(AppError::NotFound(format!(
            "Unknown transaction reference {reference}"
        ))),
    }
}

fn already_action(status: PaymentStatus) -> String {
    format!("already_{status}")
}

/// GET /
pub async fn handle_webhook_health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "intasend-webhook" }))
}
