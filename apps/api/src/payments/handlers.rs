//! Axum route handlers for M-Pesa payments.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::payment::PaymentStatus;
use crate::payments::intasend::{ProviderState, DEFAULT_API_REF};
use crate::payments::store::{complete_payment, create_payment, fail_payment, get_payment};
use crate::state::AppState;
use crate::users::store::get_user;

#[derive(Debug, Deserialize)]
pub struct StkPushRequest {
    pub user_id: String,
    /// Phone to prompt. Defaults to the user's login phone.
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StkPushResponse {
    pub transaction_reference: String,
    pub amount: i64,
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub transaction_reference: String,
    pub status: PaymentStatus,
    /// Only present when the provider was asked during this request.
    pub provider_state: Option<ProviderState>,
}

/// POST /api/v1/payments/stk-push
///
/// Sends an STK push for the premium tier and records the pending payment.
pub async fn handle_stk_push(
    State(state): State<AppState>,
    Json(request): Json<StkPushRequest>,
) -> Result<Json<StkPushResponse>, AppError> {
    let user = get_user(&state.db, &request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;

    let phone = request
        .phone
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| user.phone.clone());
    let amount = state.config.premium_amount_kes;

    let invoice_id = state
        .gateway()?
        .stk_push(&phone, amount, DEFAULT_API_REF)
        .await
        .map_err(|e| AppError::PaymentProvider(format!("STK push failed: {e}")))?;

    if !create_payment(&state.db, &user.user_id, &phone, &invoice_id, amount).await? {
        return Err(AppError::PaymentProvider(format!(
            "Provider reused invoice id {invoice_id}"
        )));
    }

    info!("STK push sent for user {} (invoice {invoice_id})", user.user_id);

    Ok(Json(StkPushResponse {
        transaction_reference: invoice_id,
        amount,
        status: PaymentStatus::Pending,
    }))
}

/// GET /api/v1/payments/:reference/status
///
/// Returns the stored status. While pending, asks the provider and applies
/// any final state it reports, so polling works even if a webhook is lost.
pub async fn handle_payment_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let payment = get_payment(&state.db, &reference)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment {reference} not found")))?;

    if payment.status.is_final() {
        return Ok(Json(PaymentStatusResponse {
            transaction_reference: reference,
            status: payment.status,
            provider_state: None,
        }));
    }

    let Some(gateway) = state.gateway.as_deref() else {
        return Ok(Json(PaymentStatusResponse {
            transaction_reference: reference,
            status: payment.status,
            provider_state: None,
        }));
    };

    let provider_state = match gateway.payment_state(&reference).await {
        Ok(provider_state) => provider_state,
        Err(e) => {
            // A failed poll is not a failed payment; report what we know.
            warn!("Status check for {reference} failed: {e}");
            return Ok(Json(PaymentStatusResponse {
                transaction_reference: reference,
                status: payment.status,
                provider_state: None,
            }));
        }
    };

    match provider_state {
        ProviderState::Paid => {
            complete_payment(&state.db, &reference).await?;
        }
        ProviderState::Failed => {
            fail_payment(&state.db, &reference).await?;
        }
        ProviderState::Pending => {}
    }

    let status = get_payment(&state.db, &reference)
        .await?
        .map(|p| p.status)
        .unwrap_or(payment.status);

    Ok(Json(PaymentStatusResponse {
        transaction_reference: reference,
        status,
        provider_state: Some(provider_state),
    }))
}
