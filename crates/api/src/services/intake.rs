//! Email intake orchestration.
//!
//! Ingest stores the raw email and mints the draft with its capability
//! token inside the request, then hands the slow work (extraction and
//! notification) to a detached task. A stalled extraction service can delay
//! a guest's email but never holds a lock on shared state, and a duplicate
//! webhook delivery stops at the message-id gate without touching the
//! pipeline again.

use tracing::{debug, info, warn};
use uuid::Uuid;

use domain::models::draft::DraftRegistration;
use domain::models::email::{normalize_message_id, InboundEmailRequest, IngestResponse};
use domain::services::extraction::classify_extraction;
use domain::services::notification::{render_outcome_email, NotificationContext};
use persistence::entities::InboundEmailEntity;
use persistence::repositories::{CreateDraftError, DraftRepository, EmailRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_email_ingested, record_notification};
use crate::services::email::EmailMessage;

/// Ingest an inbound email delivery.
///
/// The email row is stored unconditionally; extraction failing later never
/// loses the raw artifact. Re-deliveries of the same provider message id
/// are no-ops after the first ingestion.
pub async fn ingest(
    state: &AppState,
    request: &InboundEmailRequest,
) -> Result<IngestResponse, ApiError> {
    let message_id = normalize_message_id(&request.message_id);

    let email_repo = EmailRepository::new(state.pool.clone());
    let (email, duplicate) = email_repo
        .ingest(
            &request.from,
            &request.to,
            &request.subject,
            request.text.as_deref(),
            request.html.as_deref(),
            &message_id,
        )
        .await?;
    record_email_ingested(duplicate);

    if duplicate {
        debug!(
            email_id = %email.id,
            message_id = %message_id,
            "Duplicate delivery, skipping"
        );
        return Ok(IngestResponse {
            email_id: email.id,
            duplicate: true,
        });
    }

    let token = shared::token::generate_access_token();
    let draft_repo = DraftRepository::new(state.pool.clone());
    let draft = match draft_repo.create(email.id, &token).await {
        Ok(draft) => draft,
        // A racing delivery of the same message minted the draft first.
        Err(CreateDraftError::EmailAlreadyRegistered) => {
            return Ok(IngestResponse {
                email_id: email.id,
                duplicate: true,
            });
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        email_id = %email.id,
        draft_id = %draft.id,
        "Email ingested, draft registration created"
    );

    spawn_extraction(state, email);

    Ok(IngestResponse {
        email_id: draft.email_id,
        duplicate: false,
    })
}

/// Run extraction and notification for an ingested email, detached from the
/// ingest request.
pub fn spawn_extraction(state: &AppState, email: InboundEmailEntity) {
    let state = state.clone();
    tokio::spawn(async move {
        if let Err(err) = process_email(&state, &email).await {
            warn!(
                email_id = %email.id,
                error = %err,
                "Extraction pipeline failed; draft remains awaiting"
            );
        }
    });
}

async fn process_email(state: &AppState, email: &InboundEmailEntity) -> Result<(), sqlx::Error> {
    let draft_repo = DraftRepository::new(state.pool.clone());
    let email_repo = EmailRepository::new(state.pool.clone());

    // Subject-only emails still go through extraction: the subject line is
    // often enough for a usable title.
    let text = email
        .text_body
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&email.subject);

    let result = state.extractor.extract(text).await;
    let outcome = classify_extraction(result);

    let Some(draft) = draft_repo.find_by_email_id(email.id).await? else {
        warn!(email_id = %email.id, "No draft for extracted email");
        return Ok(());
    };

    let applied = draft_repo.record_outcome(draft.id, &outcome).await?;
    if !applied {
        debug!(
            draft_id = %draft.id,
            "Draft no longer awaiting extraction, outcome dropped"
        );
    }
    email_repo.mark_processed(email.id).await?;

    dispatch_notification(state, draft.id, email).await?;
    Ok(())
}

/// Send the outcome notification for a draft, at most once.
///
/// The `response_sent` check-and-set decides which of any number of
/// concurrent dispatch attempts actually sends. Delivery failures are
/// logged and do not affect the draft.
pub async fn dispatch_notification(
    state: &AppState,
    draft_id: Uuid,
    email: &InboundEmailEntity,
) -> Result<(), sqlx::Error> {
    let draft_repo = DraftRepository::new(state.pool.clone());

    let Some(entity) = draft_repo.find_by_email_id(email.id).await? else {
        return Ok(());
    };
    if entity.id != draft_id {
        return Ok(());
    }

    if !draft_repo.claim_response_pending(entity.id).await? {
        debug!(draft_id = %entity.id, "Notification already sent, skipping");
        return Ok(());
    }

    let draft: DraftRegistration = entity.into();
    let guest_link = state.config.intake.guest_link(&draft.access_token);
    let rendered = render_outcome_email(&NotificationContext {
        draft: &draft,
        guest_link: &guest_link,
        email_subject: &email.subject,
    });

    let outcome = draft.extraction_status.as_str();
    let delivery = state
        .email
        .send(EmailMessage {
            to: email.from_address.clone(),
            subject: rendered.subject,
            body_text: rendered.body_text,
        })
        .await;

    match delivery {
        Ok(()) => {
            record_notification(outcome, true);
            info!(
                draft_id = %draft.id,
                to = %email.from_address,
                outcome = %outcome,
                "Outcome notification sent"
            );
        }
        Err(err) => {
            // Best-effort: the registration stays valid and editable.
            record_notification(outcome, false);
            warn!(
                draft_id = %draft.id,
                to = %email.from_address,
                error = %err,
                "Outcome notification delivery failed"
            );
        }
    }

    Ok(())
}
