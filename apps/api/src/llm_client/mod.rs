/// LLM Client: the single point of entry for all model calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All LLM interactions MUST go through `LlmProvider` and the helpers here.
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiClient;

use prompts::JSON_ONLY_PREFIX;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {retries} attempts")]
    RetriesExhausted { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A text-in, text-out language model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single prompt and returns the trimmed response text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Names of the models that can serve `generate`.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;
}

/// Generates plain text, prepending the system prompt when one is given.
pub async fn generate_text(
    llm: &dyn LlmProvider,
    prompt: &str,
    system: Option<&str>,
) -> Result<String, LlmError> {
    let full_prompt = match system {
        Some(system) => format!("{system}\n\n{prompt}"),
        None => prompt.to_string(),
    };
    llm.generate(&full_prompt).await
}

/// Generates a JSON object (best effort).
///
/// Output that does not parse to a JSON object is wrapped as `{"raw": <text>}`
/// so callers can still show the model's answer.
pub async fn generate_json(
    llm: &dyn LlmProvider,
    prompt: &str,
    system: Option<&str>,
) -> Result<Value, LlmError> {
    let full_prompt = match system {
        Some(system) => format!("{system}\n\n{JSON_ONLY_PREFIX}\n\n{prompt}"),
        None => format!("{JSON_ONLY_PREFIX}\n\n{prompt}"),
    };
    let text = llm.generate(&full_prompt).await?;

    match parse_llm_json(&text) {
        Some(value @ Value::Object(_)) => Ok(value),
        _ => {
            warn!(
                "LLM output was not a JSON object, falling back to raw text ({} chars)",
                text.len()
            );
            Ok(json!({ "raw": text }))
        }
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?i)```(?:json)?\s*").expect("valid fence regex"))
}

fn json_span_regex() -> &'static Regex {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    SPAN.get_or_init(|| Regex::new(r"(\{[\s\S]*\}|\[[\s\S]*\])").expect("valid span regex"))
}

/// Best-effort JSON parse of model output.
///
/// Removes code fences anywhere in the text, tries a direct parse, then falls
/// back to the widest `{...}` or `[...]` span. Returns `None` when neither works.
pub fn parse_llm_json(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }

    let cleaned = fence_regex().replace_all(text, "");
    let cleaned = cleaned.replace("```", "");
    let cleaned = cleaned.trim();

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }

    let span = json_span_regex().find(cleaned)?;
    serde_json::from_str(span.as_str()).ok()
}

/// Strips a single surrounding ```lang ... ``` fence from free-text output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag on the opening fence line, if any.
    let body = match rest.find('\n') {
        Some(newline) if !rest[..newline].contains(' ') => &rest[newline + 1..],
        _ => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(body.trim())
}
