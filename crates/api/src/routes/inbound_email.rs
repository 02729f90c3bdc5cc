//! Inbound email webhook handler.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use domain::models::email::{InboundEmailRequest, IngestResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::intake;

/// Receive an inbound email delivery.
///
/// POST /api/v1/email/inbound
///
/// Idempotent on provider message id: re-deliveries return 202 with
/// `duplicate: true` and change nothing. Extraction and the outcome
/// notification run detached from this request.
pub async fn receive_inbound_email(
    State(state): State<AppState>,
    Json(request): Json<InboundEmailRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    request.validate()?;

    let response = intake::ingest(&state, &request).await?;

    Ok((StatusCode::ACCEPTED, Json(response)))
}
