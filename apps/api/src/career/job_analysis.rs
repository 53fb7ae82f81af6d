//! Job analysis: pulls title, skills and ATS keywords out of a raw job description.

use serde::{Deserialize, Serialize};

use crate::career::prompts::JOB_ANALYSIS_PROMPT_TEMPLATE;
use crate::career::{decode_llm_value, null_as_default, require_text, RawFallback};
use crate::errors::AppError;
use crate::llm_client::prompts::RECRUITER_SYSTEM;
use crate::llm_client::{generate_json, LlmProvider};

/// Structured view of a job description. Feeds every downstream prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seniority: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Model output that could not be parsed. Still usable as prompt context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RawFallback for JobAnalysis {
    fn set_raw(&mut self, raw: String) {
        self.raw = Some(raw);
    }
}

impl JobAnalysis {
    /// JSON handed to the writing prompts.
    pub fn to_prompt_json(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize job analysis: {e}")))
    }
}

pub async fn analyze_job(
    job_description: &str,
    llm: &dyn LlmProvider,
) -> Result<JobAnalysis, AppError> {
    require_text(job_description, "Paste a job description.")?;

    let prompt = JOB_ANALYSIS_PROMPT_TEMPLATE.replace("{job_description}", job_description.trim());
    let value = generate_json(llm, &prompt, Some(RECRUITER_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("Job analysis failed: {e}")))?;

    Ok(decode_llm_value(value))
}
