//! Axum route handlers for login and the premium unlock view.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::User;
use crate::payments::store::is_user_paid;
use crate::payments::unlock::whatsapp_link;
use crate::state::AppState;
use crate::users::store::{get_or_create_user, get_user};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub user_id: String,
    pub paid: bool,
    pub amount_kes: i64,
    /// Manual payment path. Always present so paid users can still reach support.
    pub whatsapp_link: String,
}

/// POST /api/v1/login
///
/// Phone + email is the whole login: the same pair always maps to the same user.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = get_or_create_user(&state.db, &request.phone, &request.email)
        .await?
        .ok_or_else(|| AppError::Validation("Enter BOTH phone and email.".to_string()))?;
    Ok(Json(user))
}

/// GET /api/v1/users/:user_id/unlock
pub async fn handle_unlock_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UnlockResponse>, AppError> {
    let user = get_user(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    let paid = is_user_paid(&state.db, &user.user_id).await?;
    let amount_kes = state.config.premium_amount_kes;

    Ok(Json(UnlockResponse {
        whatsapp_link: whatsapp_link(
            &state.config.whatsapp_number,
            &user.user_id,
            &user.phone,
            &user.email,
            amount_kes,
        ),
        user_id: user.user_id,
        paid,
        amount_kes,
    }))
}
