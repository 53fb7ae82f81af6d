// Career document generation.
// Implements: job analysis, resume rewrite, cover letter, follow-up emails,
// career pack / LinkedIn / interview extras, resume PDF ingestion, saved outputs.
// All LLM calls go through llm_client. No direct Gemini calls here.

pub mod extract;
pub mod handlers;
pub mod job_analysis;
pub mod outputs;
pub mod pack;
pub mod prompts;
pub mod writer;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;

/// Structured LLM results that can carry the raw model text when parsing fails.
pub trait RawFallback: DeserializeOwned + Default {
    fn set_raw(&mut self, raw: String);
}

/// Decodes a `generate_json` value into `T`.
///
/// `{"raw": ...}` decodes directly into the `raw` field. A value of the wrong
/// shape keeps its text in `raw` and leaves the structured fields empty.
pub fn decode_llm_value<T: RawFallback>(value: Value) -> T {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("LLM JSON did not match the expected shape ({e}), keeping raw text");
            let mut fallback = T::default();
            fallback.set_raw(raw_text(&value));
            fallback
        }
    }
}

fn raw_text(value: &Value) -> String {
    value
        .get("raw")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Treats JSON `null` as the type's default. Models emit `null` for unknown fields.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn require_text(value: &str, message: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}
