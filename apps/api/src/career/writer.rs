//! Resume rewrite, cover letter and follow-up email writers.
//!
//! Resume and cover letter are free text; emails are structured and fall back
//! to a single raw-text email when the model does not return usable JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::career::job_analysis::JobAnalysis;
use crate::career::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, FOLLOW_UP_EMAILS_PROMPT_TEMPLATE,
    RESUME_REWRITE_PROMPT_TEMPLATE,
};
use crate::career::{null_as_default, require_text};
use crate::errors::AppError;
use crate::llm_client::prompts::RECRUITER_SYSTEM;
use crate::llm_client::{generate_json, generate_text, strip_code_fences, LlmProvider};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpEmail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub send_after: String,
}

/// Rewrites the resume as ATS-optimized Markdown.
pub async fn rewrite_resume(
    resume_text: &str,
    analysis: &JobAnalysis,
    llm: &dyn LlmProvider,
) -> Result<String, AppError> {
    require_text(resume_text, "Provide resume text.")?;

    let prompt = RESUME_REWRITE_PROMPT_TEMPLATE
        .replace("{job_analysis}", &analysis.to_prompt_json()?)
        .replace("{resume_text}", resume_text.trim());

    let text = generate_text(llm, &prompt, Some(RECRUITER_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("Resume rewrite failed: {e}")))?;
    Ok(strip_code_fences(&text).to_string())
}

pub async fn generate_cover_letter(
    resume_text: &str,
    analysis: &JobAnalysis,
    llm: &dyn LlmProvider,
) -> Result<String, AppError> {
    require_text(resume_text, "Provide resume text.")?;

    let prompt = COVER_LETTER_PROMPT_TEMPLATE
        .replace("{job_analysis}", &analysis.to_prompt_json()?)
        .replace("{resume_text}", resume_text.trim());

    let text = generate_text(llm, &prompt, Some(RECRUITER_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))?;
    Ok(strip_code_fences(&text).to_string())
}

pub async fn generate_emails(
    analysis: &JobAnalysis,
    llm: &dyn LlmProvider,
) -> Result<Vec<FollowUpEmail>, AppError> {
    let prompt =
        FOLLOW_UP_EMAILS_PROMPT_TEMPLATE.replace("{job_analysis}", &analysis.to_prompt_json()?);

    let value = generate_json(llm, &prompt, Some(RECRUITER_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("Follow-up email generation failed: {e}")))?;

    Ok(emails_from_value(value))
}

fn emails_from_value(value: Value) -> Vec<FollowUpEmail> {
    if let Some(emails) = value.get("emails") {
        match serde_json::from_value::<Vec<FollowUpEmail>>(emails.clone()) {
            Ok(emails) => {
                return emails
                    .into_iter()
                    .filter(|e| !e.body.trim().is_empty())
                    .collect()
            }
            Err(e) => warn!("Follow-up emails had an unexpected shape: {e}"),
        }
    }

    let body = value
        .get("raw")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string());

    vec![FollowUpEmail {
        subject: "Follow-up".to_string(),
        body,
        send_after: String::new(),
    }]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::StubLlm;

    fn analysis() -> JobAnalysis {
        JobAnalysis {
            job_title: "Data Analyst".into(),
            keywords: vec!["SQL".into(), "Power BI".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_rewrite_resume_strips_fences_and_sends_context() {
        let llm = StubLlm::always("```markdown\n# Jane Wanjiku\n## Experience\n- Built dashboards\n```");

        let resume = rewrite_resume("Jane Wanjiku, analyst at KCB", &analysis(), &llm)
            .await
            .unwrap();
        assert_eq!(resume, "# Jane Wanjiku\n## Experience\n- Built dashboards");

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Jane Wanjiku, analyst at KCB"));
        assert!(prompt.contains("\"Power BI\""));
    }

    #[tokio::test]
    async fn test_cover_letter_requires_resume() {
        let llm = StubLlm::always("Dear Hiring Manager");
        let err = generate_cover_letter("", &analysis(), &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_generate_emails_parses_structured_output() {
        let llm = StubLlm::always(
            r#"{"emails": [
                {"subject": "Application: Data Analyst", "body": "Dear Hiring Team...", "send_after": "3 days"},
                {"subject": "Thank you", "body": "Thank you for the interview...", "send_after": null}
            ]}"#,
        );
        let emails = generate_emails(&analysis(), &llm).await.unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].subject, "Application: Data Analyst");
        assert_eq!(emails[1].send_after, "");
    }

    #[test]
    fn test_emails_fall_back_to_raw_text() {
        let emails = emails_from_value(json!({"raw": "Email 1: Thank you for..."}));
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, "Follow-up");
        assert_eq!(emails[0].body, "Email 1: Thank you for...");
    }

    #[test]
    fn test_emails_with_wrong_shape_keep_json_text() {
        let emails = emails_from_value(json!({"emails": "see below"}));
        assert_eq!(emails.len(), 1);
        assert!(emails[0].body.contains("see below"));
    }

    #[test]
    fn test_blank_emails_are_dropped() {
        let emails = emails_from_value(json!({"emails": [
            {"subject": "Empty", "body": "  "},
            {"subject": "Real", "body": "Hello"}
        ]}));
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, "Real");
    }
}
