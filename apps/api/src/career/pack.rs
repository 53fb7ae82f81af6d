//! One-shot extras: full career pack, LinkedIn optimization, interview prep.
//!
//! These work straight from the job description and candidate text and do not
//! need a prior job analysis.

use serde::{Deserialize, Serialize};

use crate::career::prompts::{
    CAREER_PACK_PROMPT_TEMPLATE, INTERVIEW_PROMPT_TEMPLATE, LINKEDIN_PROMPT_TEMPLATE,
};
use crate::career::{decode_llm_value, null_as_default, require_text, RawFallback};
use crate::errors::AppError;
use crate::llm_client::prompts::RECRUITER_SYSTEM;
use crate::llm_client::{generate_json, LlmProvider};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strong_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_answer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerPack {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ats_cv: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_letter: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interview_prep: Vec<InterviewQuestion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gap_analysis: GapAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RawFallback for CareerPack {
    fn set_raw(&mut self, raw: String) {
        self.raw = Some(raw);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedInProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub about: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience_bullets: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub networking_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RawFallback for LinkedInProfile {
    fn set_raw(&mut self, raw: String) {
        self.raw = Some(raw);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewPrep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub interview_prep: Vec<InterviewQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RawFallback for InterviewPrep {
    fn set_raw(&mut self, raw: String) {
        self.raw = Some(raw);
    }
}

/// CV, cover letter, interview prep and gap analysis in a single call.
pub async fn build_career_pack(
    job_description: &str,
    candidate_text: &str,
    llm: &dyn LlmProvider,
) -> Result<CareerPack, AppError> {
    require_text(job_description, "Paste a job description.")?;
    require_text(candidate_text, "Provide your CV or career notes.")?;

    let prompt = CAREER_PACK_PROMPT_TEMPLATE
        .replace("{job_description}", job_description.trim())
        .replace("{candidate_text}", candidate_text.trim());

    let value = generate_json(llm, &prompt, Some(RECRUITER_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("Career pack generation failed: {e}")))?;
    Ok(decode_llm_value(value))
}

pub async fn linkedin_optimization(
    candidate_text: &str,
    llm: &dyn LlmProvider,
) -> Result<LinkedInProfile, AppError> {
    require_text(candidate_text, "Provide your CV or career notes.")?;

    let prompt = LINKEDIN_PROMPT_TEMPLATE.replace("{candidate_text}", candidate_text.trim());
    let value = generate_json(llm, &prompt, Some(RECRUITER_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("LinkedIn optimization failed: {e}")))?;
    Ok(decode_llm_value(value))
}

pub async fn interview_answers(
    job_description: &str,
    candidate_text: &str,
    llm: &dyn LlmProvider,
) -> Result<InterviewPrep, AppError> {
    require_text(job_description, "Paste a job description.")?;
    require_text(candidate_text, "Provide your CV or career notes.")?;

    let prompt = INTERVIEW_PROMPT_TEMPLATE
        .replace("{job_description}", job_description.trim())
        .replace("{candidate_text}", candidate_text.trim());

    let value = generate_json(llm, &prompt, Some(RECRUITER_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("Interview prep failed: {e}")))?;
    Ok(decode_llm_value(value))
}
