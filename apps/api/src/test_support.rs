//! In-process doubles for the LLM and the payment provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::llm_client::{LlmError, LlmProvider};
use crate::payments::intasend::{IntaSendError, PaymentGateway, ProviderState};
use crate::state::AppState;

/// Replies with the response of the first route whose marker appears in the prompt.
pub struct StubLlm {
    routes: Vec<(String, String)>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn always(response: &str) -> Self {
        Self {
            routes: Vec::new(),
            fallback: Some(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn routed(routes: &[(&str, &str)]) -> Self {
        Self {
            routes: routes
                .iter()
                .map(|(marker, response)| (marker.to_string(), response.to_string()))
                .collect(),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.routes
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, response)| response.clone())
            .or_else(|| self.fallback.clone())
            .ok_or(LlmError::EmptyContent)
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        Ok(vec!["models/stub-1".to_string()])
    }
}

/// Issues sequential invoice ids and reports whatever state the test sets.
#[derive(Default)]
pub struct StubGateway {
    pushes: Mutex<Vec<(String, i64, String)>>,
    states: Mutex<HashMap<String, ProviderState>>,
}

impl StubGateway {
    pub fn set_state(&self, invoice_id: &str, state: ProviderState) {
        self.states
            .lock()
            .unwrap()
            .insert(invoice_id.to_string(), state);
    }

    pub fn pushes(&self) -> Vec<(String, i64, String)> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn stk_push(
        &self,
        phone: &str,
        amount: i64,
        api_ref: &str,
    ) -> Result<String, IntaSendError> {
        let mut pushes = self.pushes.lock().unwrap();
        pushes.push((phone.to_string(), amount, api_ref.to_string()));
        Ok(format!("INV-{}", pushes.len()))
    }

    async fn payment_state(&self, invoice_id: &str) -> Result<ProviderState, IntaSendError> {
        Ok(self
            .states
            .lock()
            .unwrap()
            .get(invoice_id)
            .copied()
            .unwrap_or(ProviderState::Pending))
    }
}

/// App state over a fresh in-memory database with the given doubles.
pub async fn test_state(
    llm: Option<Arc<dyn LlmProvider>>,
    gateway: Option<Arc<dyn PaymentGateway>>,
) -> AppState {
    AppState {
        db: crate::db::test_pool().await,
        llm,
        gateway,
        config: Config::for_tests(),
    }
}
