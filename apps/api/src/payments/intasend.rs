//! IntaSend M-Pesa client: STK push and payment status.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::IntaSendConfig;
use crate::users::normalize_phone;

/// Default `api_ref` attached to premium-tier STK pushes.
pub const DEFAULT_API_REF: &str = "career-accelerator-premium-v1";

const STK_PUSH_TIMEOUT: Duration = Duration::from_secs(20);
const STATUS_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum IntaSendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response did not contain an invoice id: {0}")]
    MissingInvoice(String),

    #[error("Phone number '{0}' has no digits")]
    InvalidPhone(String),
}

/// Provider-side payment state, collapsed to what the app acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderState {
    Paid,
    Failed,
    Pending,
}

impl ProviderState {
    /// Maps an IntaSend `state`/`status` string. Unknown values count as pending.
    pub fn classify(state: &str) -> Self {
        match state.trim().to_uppercase().as_str() {
            "PAID" | "COMPLETED" | "COMPLETE" | "SUCCESS" => ProviderState::Paid,
            "FAILED" | "CANCELLED" | "CANCELED" | "DECLINED" => ProviderState::Failed,
            _ => ProviderState::Pending,
        }
    }
}

/// Mobile-money provider seam. Implemented by `IntaSendClient`; tests use a stub.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Prompts the phone to approve `amount` KES. Returns the provider invoice id.
    async fn stk_push(
        &self,
        phone: &str,
        amount: i64,
        api_ref: &str,
    ) -> Result<String, IntaSendError>;

    async fn payment_state(&self, invoice_id: &str) -> Result<ProviderState, IntaSendError>;
}

#[derive(Clone)]
pub struct IntaSendClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl IntaSendClient {
    /// Returns `None` unless both IntaSend keys are configured.
    pub fn from_config(config: &IntaSendConfig) -> anyhow::Result<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        Ok(Some(Self {
            http: Client::builder()
                .build()
                .context("Failed to build IntaSend HTTP client")?,
            api_key,
            base_url: config.base_url.clone(),
        }))
    }

    async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
        timeout: Duration,
    ) -> Result<Value, IntaSendError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        info!("IntaSend {path} responded {status}");

        if !status.is_success() {
            warn!("IntaSend {path} failed with {status}: {text}");
            return Err(IntaSendError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|_| IntaSendError::Api {
            status: status.as_u16(),
            message: format!("non-JSON response: {text}"),
        })
    }
}

#[derive(Debug, Serialize)]
struct StkPushRequest<'a> {
    /// IntaSend expects the amount as a string.
    amount: String,
    phone_number: String,
    api_ref: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusRequest<'a> {
    invoice_id: &'a str,
}

/// Invoice id from an STK push response (`invoice_id`, or `invoice` as string
/// or object). A null or empty `invoice_id` falls through to `invoice`.
fn invoice_from_response(data: &Value) -> Option<String> {
    ["invoice_id", "invoice"]
        .iter()
        .find_map(|key| match data.get(*key)? {
            Value::String(s) => non_empty(s),
            Value::Object(obj) => obj.get("invoice_id").and_then(Value::as_str).and_then(non_empty),
            _ => None,
        })
}

/// State string from a status or webhook payload: the first non-empty of
/// `state` and `status`, also looked up inside a nested `invoice` object.
pub fn state_from_payload(data: &Value) -> String {
    let lookup = |v: &Value| {
        ["state", "status"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).and_then(non_empty))
    };
    lookup(data)
        .or_else(|| data.get("invoice").and_then(lookup))
        .unwrap_or_default()
        .to_uppercase()
}

/// Trimmed copy of `s`, or `None` when blank.
pub(crate) fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[async_trait]
impl PaymentGateway for IntaSendClient {
    async fn stk_push(
        &self,
        phone: &str,
        amount: i64,
        api_ref: &str,
    ) -> Result<String, IntaSendError> {
        let msisdn = normalize_phone(phone);
        if msisdn.is_empty() {
            return Err(IntaSendError::InvalidPhone(phone.to_string()));
        }

        let body = StkPushRequest {
            amount: amount.to_string(),
            phone_number: msisdn,
            api_ref,
        };
        let data = self
            .post_json("/payment/mpesa-stk-push/", &body, STK_PUSH_TIMEOUT)
            .await?;

        invoice_from_response(&data).ok_or_else(|| IntaSendError::MissingInvoice(data.to_string()))
    }

    async fn payment_state(&self, invoice_id: &str) -> Result<ProviderState, IntaSendError> {
        let data = self
            .post_json("/payment/status/", &StatusRequest { invoice_id }, STATUS_TIMEOUT)
            .await?;
        Ok(ProviderState::classify(&state_from_payload(&data)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_classify_states() {
        for paid in ["PAID", "completed", "Success", " COMPLETE "] {
            assert_eq!(ProviderState::classify(paid), ProviderState::Paid, "{paid}");
        }
        for failed in ["FAILED", "cancelled", "CANCELED", "Declined"] {
            assert_eq!(ProviderState::classify(failed), ProviderState::Failed, "{failed}");
        }
        for pending in ["PENDING", "PROCESSING", "", "weird"] {
            assert_eq!(ProviderState::classify(pending), ProviderState::Pending, "{pending}");
        }
    }

    #[test]
    fn test_invoice_from_response_variants() {
        assert_eq!(
            invoice_from_response(&json!({"invoice_id": "ABC123"})).as_deref(),
            Some("ABC123")
        );
        assert_eq!(
            invoice_from_response(&json!({"invoice": "XYZ"})).as_deref(),
            Some("XYZ")
        );
        assert_eq!(
            invoice_from_response(&json!({"invoice": {"invoice_id": "NESTED", "state": "PENDING"}}))
                .as_deref(),
            Some("NESTED")
        );
        assert!(invoice_from_response(&json!({"id": "nope"})).is_none());
        assert!(invoice_from_response(&json!({"invoice_id": ""})).is_none());
        assert_eq!(
            invoice_from_response(&json!({"invoice_id": null, "invoice": "XYZ"})).as_deref(),
            Some("XYZ")
        );
        assert_eq!(
            invoice_from_response(&json!({"invoice_id": " ", "invoice": {"invoice_id": "NESTED"}}))
                .as_deref(),
            Some("NESTED")
        );
    }

    #[test]
    fn test_state_from_payload_prefers_state_then_status() {
        assert_eq!(state_from_payload(&json!({"state": "paid", "status": "x"})), "PAID");
        assert_eq!(state_from_payload(&json!({"status": "failed"})), "FAILED");
        assert_eq!(
            state_from_payload(&json!({"invoice": {"state": "COMPLETE"}})),
            "COMPLETE"
        );
        assert_eq!(state_from_payload(&json!({})), "");
    }

    #[test]
    fn test_state_from_payload_skips_null_and_blank_values() {
        assert_eq!(
            state_from_payload(&json!({"state": null, "status": "COMPLETE"})),
            "COMPLETE"
        );
        assert_eq!(state_from_payload(&json!({"state": "", "status": "paid"})), "PAID");
        assert_eq!(state_from_payload(&json!({"state": 3, "status": "failed"})), "FAILED");
        assert_eq!(
            state_from_payload(&json!({"state": null, "invoice": {"state": "", "status": "COMPLETE"}})),
            "COMPLETE"
        );
        assert_eq!(state_from_payload(&json!({"state": null, "status": "  "})), "");
    }

    #[test]
    fn test_stk_push_body_sends_amount_as_string() {
        let body = StkPushRequest {
            amount: 1000.to_string(),
            phone_number: normalize_phone("0722123456"),
            api_ref: DEFAULT_API_REF,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "amount": "1000",
                "phone_number": "254722123456",
                "api_ref": "career-accelerator-premium-v1"
            })
        );
    }

    #[test]
    fn test_client_requires_both_keys() {
        let mut config = IntaSendConfig {
            api_key: Some("secret".into()),
            publishable_key: None,
            base_url: "https://sandbox.intasend.com/api/v1".into(),
            webhook_url: None,
        };
        assert!(IntaSendClient::from_config(&config).unwrap().is_none());

        config.publishable_key = Some("public".into());
        assert!(IntaSendClient::from_config(&config).unwrap().is_some());
    }
}
