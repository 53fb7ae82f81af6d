//! Axum route handlers for the admin API.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::admin::require_admin;
use crate::career::outputs::{load_user_output, SavedOutput};
use crate::errors::AppError;
use crate::models::payment::Payment;
use crate::payments::store::{is_user_paid, list_payments, mark_user_paid, DEFAULT_LIST_LIMIT};
use crate::payments::unlock::admin_unlock_message;
use crate::state::AppState;
use crate::users::store::{find_users, get_user};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub user_id: String,
    pub phone: String,
    pub email: String,
    pub paid: bool,
}

#[derive(Debug, Serialize)]
pub struct UserSearchResponse {
    pub users: Vec<AdminUserView>,
}

#[derive(Debug, Serialize)]
pub struct MarkPaidResponse {
    pub user_id: String,
    pub paid: bool,
    pub unlock_message: String,
}

#[derive(Debug, Serialize)]
pub struct AdminOutputsResponse {
    pub user_id: String,
    pub paid: bool,
    pub outputs: Option<SavedOutput>,
    pub unlock_message: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub limit: Option<i64>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct LlmModelsResponse {
    pub configured_model: String,
    pub models: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/users?phone=&email=
pub async fn handle_find_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<UserSearchResponse>, AppError> {
    require_admin(&headers, &state.config)?;

    let phone = query.phone.as_deref().filter(|p| !p.trim().is_empty());
    let email = query.email.as_deref().filter(|e| !e.trim().is_empty());
    if phone.is_none() && email.is_none() {
        return Err(AppError::Validation(
            "Search by phone or email.".to_string(),
        ));
    }

    let mut users = Vec::new();
    for user in find_users(&state.db, phone, email).await? {
        let paid = is_user_paid(&state.db, &user.user_id).await?;
        users.push(AdminUserView {
            user_id: user.user_id,
            phone: user.phone,
            email: user.email,
            paid,
        });
    }

    Ok(Json(UserSearchResponse { users }))
}

/// POST /api/v1/admin/users/:user_id/mark-paid
///
/// Manual unlock after a payment is confirmed over WhatsApp.
pub async fn handle_mark_paid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<MarkPaidResponse>, AppError> {
    require_admin(&headers, &state.config)?;

    let user = get_user(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    mark_user_paid(&state.db, &user.user_id, state.config.premium_amount_kes).await?;
    info!("Admin unlocked user {}", user.user_id);

    Ok(Json(MarkPaidResponse {
        unlock_message: admin_unlock_message(&user.user_id, &user.phone, &user.email),
        user_id: user.user_id,
        paid: true,
    }))
}

/// GET /api/v1/admin/users/:user_id/outputs
pub async fn handle_user_outputs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<AdminOutputsResponse>, AppError> {
    require_admin(&headers, &state.config)?;

    let user = get_user(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    let paid = is_user_paid(&state.db, &user.user_id).await?;
    let outputs = load_user_output(&state.db, &user.user_id).await?;

    Ok(Json(AdminOutputsResponse {
        unlock_message: admin_unlock_message(&user.user_id, &user.phone, &user.email),
        user_id: user.user_id,
        paid,
        outputs,
    }))
}

/// GET /api/v1/admin/payments?limit=&user_id=
pub async fn handle_list_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<PaymentListResponse>, AppError> {
    require_admin(&headers, &state.config)?;

    let user_id = query.user_id.as_deref().filter(|u| !u.trim().is_empty());
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let payments = list_payments(&state.db, user_id, limit).await?;

    Ok(Json(PaymentListResponse { payments }))
}

/// GET /api/v1/admin/llm/models
///
/// Connectivity check: lists the models the configured key can use.
pub async fn handle_llm_models(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LlmModelsResponse>, AppError> {
    require_admin(&headers, &state.config)?;

    let models = state.llm()?.list_models().await.map_err(|e| {
        warn!("Listing LLM models failed: {e}");
        AppError::Llm(format!("Listing models failed: {e}"))
    })?;

    Ok(Json(LlmModelsResponse {
        configured_model: state.config.gemini.model.clone(),
        models,
    }))
}
