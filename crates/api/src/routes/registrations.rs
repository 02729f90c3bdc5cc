//! Guest capability-token routes for draft registrations.
//!
//! No authentication beyond token possession: the opaque token in the path
//! is the credential. An unknown token yields the same 404 whatever it
//! looks like; the handlers never branch on token shape.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;
use validator::Validate;

use domain::models::draft::{ConfirmDraftResponse, DraftView, UpdateDraftRequest};
use persistence::repositories::DraftRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_event_materialized;

/// Resolve a draft registration by capability token.
///
/// GET /api/v1/registrations/:token
pub async fn resolve(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<DraftView>, ApiError> {
    let repo = DraftRepository::new(state.pool.clone());

    let draft = repo
        .find_by_token(&token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

    Ok(Json(draft.into()))
}

/// Patch a draft's proposed event fields.
///
/// PATCH /api/v1/registrations/:token
///
/// Absent fields are left untouched. Patching never confirms; that is a
/// separate explicit action.
pub async fn update(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(patch): Json<UpdateDraftRequest>,
) -> Result<Json<DraftView>, ApiError> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(ApiError::Validation(
            "At least one field is required".to_string(),
        ));
    }

    let repo = DraftRepository::new(state.pool.clone());
    let draft = repo.update_fields(&token, &patch).await?;

    Ok(Json(draft.into()))
}

/// Confirm a draft, materializing its event.
///
/// POST /api/v1/registrations/:token/confirm
///
/// Requires title, start and end to be present; otherwise the confirmation
/// is refused with 422 and the draft stays editable. Confirming an
/// already-confirmed draft returns the existing event id.
pub async fn confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ConfirmDraftResponse>, ApiError> {
    let repo = DraftRepository::new(state.pool.clone());

    let outcome = repo
        .confirm(
            &token,
            &state.config.intake.default_group,
            &state.config.intake.default_group_color,
        )
        .await?;

    if outcome.newly_materialized {
        record_event_materialized("draft");
        info!(event_id = %outcome.event_id, "Draft confirmed, event materialized");
    }

    Ok(Json(ConfirmDraftResponse {
        event_id: outcome.event_id,
    }))
}
