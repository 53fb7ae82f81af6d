//! Axum route handlers for the career generation API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::career::extract::extract_text_from_pdf;
use crate::career::job_analysis::{analyze_job, JobAnalysis};
use crate::career::outputs::{load_user_output, save_user_output, SavedOutput};
use crate::career::pack::{
    build_career_pack, interview_answers, linkedin_optimization, CareerPack, InterviewPrep,
    LinkedInProfile,
};
use crate::career::require_text;
use crate::career::writer::{
    generate_cover_letter, generate_emails, rewrite_resume, FollowUpEmail,
};
use crate::errors::AppError;
use crate::payments::store::is_user_paid;
use crate::state::AppState;
use crate::users::store::get_user;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeJobRequest {
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeJobResponse {
    pub job_analysis: JobAnalysis,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub characters: usize,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_id: String,
    pub resume_text: String,
    /// Result of an earlier /jobs/analyze call. Takes precedence over `job_description`.
    pub job_analysis: Option<JobAnalysis>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub job_analysis: JobAnalysis,
    pub resume_markdown: String,
    pub cover_letter: String,
    pub emails: Vec<FollowUpEmail>,
    pub saved: bool,
}

#[derive(Debug, Deserialize)]
pub struct CareerPackRequest {
    pub job_description: String,
    pub candidate_text: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkedInRequest {
    pub candidate_text: String,
}

#[derive(Debug, Serialize)]
pub struct UserOutputsResponse {
    pub user_id: String,
    pub paid: bool,
    pub outputs: SavedOutput,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/analyze
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeJobRequest>,
) -> Result<Json<AnalyzeJobResponse>, AppError> {
    require_text(&request.job_description, "Paste a job description.")?;
    let job_analysis = analyze_job(&request.job_description, state.llm()?).await?;
    Ok(Json(AnalyzeJobResponse { job_analysis }))
}

/// POST /api/v1/resumes/extract
///
/// Multipart upload with a single `file` field holding the resume PDF.
pub async fn handle_extract_resume(
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
        let text = extract_text_from_pdf(data).await?;
        let characters = text.chars().count();
        return Ok(Json(ExtractResponse { text, characters }));
    }

    Err(AppError::Validation(
        "Upload a PDF in the 'file' field.".to_string(),
    ))
}

/// POST /api/v1/generate
///
/// Resume rewrite, cover letter and follow-up emails, generated concurrently
/// and saved as the user's latest outputs.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    require_text(&request.resume_text, "Provide resume text.")?;

    let user = get_user(&state.db, &request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;
    let llm = state.llm()?;

    let job_analysis = match (request.job_analysis, request.job_description) {
        (Some(analysis), _) => analysis,
        (None, Some(jd)) if !jd.trim().is_empty() => analyze_job(&jd, llm).await?,
        _ => return Err(AppError::Validation("Analyse the job first.".to_string())),
    };

    let (resume_markdown, cover_letter, emails) = tokio::try_join!(
        rewrite_resume(&request.resume_text, &job_analysis, llm),
        generate_cover_letter(&request.resume_text, &job_analysis, llm),
        generate_emails(&job_analysis, llm),
    )?;

    let saved = save_user_output(
        &state.db,
        &user.user_id,
        &resume_markdown,
        &cover_letter,
        &emails,
    )
    .await?;

    info!(
        "Generated documents for user {} ({} emails)",
        user.user_id,
        emails.len()
    );

    Ok(Json(GenerateResponse {
        job_analysis,
        resume_markdown,
        cover_letter,
        emails,
        saved,
    }))
}

/// POST /api/v1/career-pack
pub async fn handle_career_pack(
    State(state): State<AppState>,
    Json(request): Json<CareerPackRequest>,
) -> Result<Json<CareerPack>, AppError> {
    let pack =
        build_career_pack(&request.job_description, &request.candidate_text, state.llm()?).await?;
    Ok(Json(pack))
}

/// POST /api/v1/linkedin
pub async fn handle_linkedin(
    State(state): State<AppState>,
    Json(request): Json<LinkedInRequest>,
) -> Result<Json<LinkedInProfile>, AppError> {
    let profile = linkedin_optimization(&request.candidate_text, state.llm()?).await?;
    Ok(Json(profile))
}

/// POST /api/v1/interview
pub async fn handle_interview(
    State(state): State<AppState>,
    Json(request): Json<CareerPackRequest>,
) -> Result<Json<InterviewPrep>, AppError> {
    let prep =
        interview_answers(&request.job_description, &request.candidate_text, state.llm()?).await?;
    Ok(Json(prep))
}

/// GET /api/v1/users/:user_id/outputs
pub async fn handle_get_outputs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserOutputsResponse>, AppError> {
    let outputs = load_user_output(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No saved outputs. Generate first.".to_string()))?;
    let paid = is_user_paid(&state.db, &user_id).await?;

    Ok(Json(UserOutputsResponse {
        user_id,
        paid,
        outputs,
    }))
}
