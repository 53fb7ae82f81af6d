use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmProvider;
use crate::payments::intasend::PaymentGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// None when GEMINI_API_KEY is not set. Generation endpoints then answer 503.
    pub llm: Option<Arc<dyn LlmProvider>>,
    /// None when IntaSend keys are not set. STK push is then unavailable,
    /// but webhooks and manual admin unlocks keep working.
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub config: Config,
}

impl AppState {
    pub fn llm(&self) -> Result<&dyn LlmProvider, AppError> {
        self.llm.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable(
                "Gemini API key not found. Set 'GEMINI_API_KEY' as an environment variable."
                    .to_string(),
            )
        })
    }

    pub fn gateway(&self) -> Result<&dyn PaymentGateway, AppError> {
        self.gateway.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable(
                "M-Pesa payments are not configured. Pay via WhatsApp instead.".to_string(),
            )
        })
    }
}
