//! Draft registration repository for database operations.
//!
//! Drafts are reachable by capability token only: possession of the token is
//! the credential, and lookups never distinguish a malformed token from an
//! unknown one. Confirmation funnels through the event materializer inside a
//! single transaction, with the draft row locked so concurrent confirms
//! resolve to exactly one materialized event.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use domain::models::draft::UpdateDraftRequest;
use domain::models::event::{RegistrationSource, RequiredField};
use domain::services::extraction::ExtractionOutcome;

use crate::entities::{DraftRegistrationEntity, ExtractionStatusDb};
use crate::metrics::QueryTimer;
use crate::repositories::{EventRepository, GroupRepository};

const DRAFT_COLUMNS: &str = "id, email_id, access_token, extraction_status, missing_fields, \
                             extraction_error, title, description, location, starts_at, ends_at, \
                             all_day, label, event_id, response_sent, created_at, updated_at";

/// Errors from creating a draft registration.
#[derive(Debug, Error)]
pub enum CreateDraftError {
    /// The freshly minted token already exists. With 256-bit tokens this
    /// means the entropy source is broken; callers must not retry silently.
    #[error("Capability token collision on insert")]
    TokenCollision,

    /// The email already has a draft (unique email_id).
    #[error("Email already has a draft registration")]
    EmailAlreadyRegistered,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Errors from patching a draft's fields.
#[derive(Debug, Error)]
pub enum UpdateDraftError {
    #[error("Draft registration not found")]
    NotFound,

    /// The draft is terminal: an event has been materialized from it.
    #[error("Draft registration already confirmed")]
    AlreadyConfirmed,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Errors from confirming a draft.
#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("Draft registration not found")]
    NotFound,

    /// Required event fields are still missing; confirmation is refused.
    #[error("Draft registration is incomplete")]
    Incomplete(Vec<RequiredField>),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Result of a confirm call.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmOutcome {
    pub event_id: Uuid,
    /// False when the draft had already been confirmed and the existing
    /// event id was returned unchanged.
    pub newly_materialized: bool,
}

/// Repository for draft registration database operations.
#[derive(Clone)]
pub struct DraftRepository {
    pool: PgPool,
}

impl DraftRepository {
    /// Creates a new DraftRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty draft for an ingested email.
    ///
    /// The token is minted before extraction runs so the guest link can go
    /// out regardless of the extraction outcome.
    pub async fn create(
        &self,
        email_id: Uuid,
        access_token: &str,
    ) -> Result<DraftRegistrationEntity, CreateDraftError> {
        let timer = QueryTimer::new("create_draft");
        let result = sqlx::query_as::<_, DraftRegistrationEntity>(&format!(
            r#"
            INSERT INTO draft_registrations (email_id, access_token)
            VALUES ($1, $2)
            RETURNING {DRAFT_COLUMNS}
            "#,
        ))
        .bind(email_id)
        .bind(access_token)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        result.map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                match db_err.constraint() {
                    Some(c) if c.contains("access_token") => CreateDraftError::TokenCollision,
                    Some(c) if c.contains("email_id") => CreateDraftError::EmailAlreadyRegistered,
                    _ => CreateDraftError::Db(err),
                }
            }
            _ => CreateDraftError::Db(err),
        })
    }

    /// Resolve a draft by capability token.
    ///
    /// A plain equality lookup: any token that matches no row is the same
    /// `None`, whatever it looks like.
    pub async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<DraftRegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_draft_by_token");
        let result = sqlx::query_as::<_, DraftRegistrationEntity>(&format!(
            r#"
            SELECT {DRAFT_COLUMNS}
            FROM draft_registrations
            WHERE access_token = $1
            "#,
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the draft derived from an email, if any.
    pub async fn find_by_email_id(
        &self,
        email_id: Uuid,
    ) -> Result<Option<DraftRegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_draft_by_email_id");
        let result = sqlx::query_as::<_, DraftRegistrationEntity>(&format!(
            r#"
            SELECT {DRAFT_COLUMNS}
            FROM draft_registrations
            WHERE email_id = $1
            "#,
        ))
        .bind(email_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Record the extraction outcome on a draft.
    ///
    /// Only an `awaiting` draft accepts an outcome, so a duplicate
    /// extraction task cannot clobber fields the guest has already edited.
    /// Extracted values merge under the same patch semantics as guest
    /// updates. Returns whether the outcome was applied.
    pub async fn record_outcome(
        &self,
        id: Uuid,
        outcome: &ExtractionOutcome,
    ) -> Result<bool, sqlx::Error> {
        let (status, fields, missing, error) = match outcome {
            ExtractionOutcome::Succeeded { fields } => {
                (ExtractionStatusDb::Succeeded, Some(fields), Vec::new(), None)
            }
            ExtractionOutcome::MissingData { fields, missing } => (
                ExtractionStatusDb::MissingData,
                Some(fields),
                missing.iter().map(|f| f.as_str().to_string()).collect(),
                None,
            ),
            ExtractionOutcome::Failed { error } => {
                (ExtractionStatusDb::Failed, None, Vec::new(), Some(error.clone()))
            }
        };

        let timer = QueryTimer::new("record_draft_outcome");
        let result = sqlx::query(
            r#"
            UPDATE draft_registrations
            SET extraction_status = $2,
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                starts_at = COALESCE($6, starts_at),
                ends_at = COALESCE($7, ends_at),
                all_day = COALESCE($8, all_day),
                missing_fields = $9,
                extraction_error = $10,
                updated_at = NOW()
            WHERE id = $1 AND extraction_status = $11
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(fields.and_then(|f| f.title.as_deref()))
        .bind(fields.and_then(|f| f.description.as_deref()))
        .bind(fields.and_then(|f| f.location.as_deref()))
        .bind(fields.and_then(|f| f.start))
        .bind(fields.and_then(|f| f.end))
        .bind(fields.and_then(|f| f.all_day))
        .bind(&missing)
        .bind(error)
        .bind(ExtractionStatusDb::Awaiting)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected() == 1)
    }

    /// Apply a guest's field-level patch to an unconfirmed draft.
    ///
    /// Absent fields stay untouched; the patch never changes status.
    pub async fn update_fields(
        &self,
        token: &str,
        patch: &UpdateDraftRequest,
    ) -> Result<DraftRegistrationEntity, UpdateDraftError> {
        let timer = QueryTimer::new("update_draft_fields");
        let updated = sqlx::query_as::<_, DraftRegistrationEntity>(&format!(
            r#"
            UPDATE draft_registrations
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                all_day = COALESCE($7, all_day),
                label = COALESCE($8, label),
                updated_at = NOW()
            WHERE access_token = $1 AND event_id IS NULL
            RETURNING {DRAFT_COLUMNS}
            "#,
        ))
        .bind(token)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.location.as_deref())
        .bind(patch.starts_at)
        .bind(patch.ends_at)
        .bind(patch.all_day)
        .bind(patch.label.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        match updated {
            Some(entity) => Ok(entity),
            None => match self.find_by_token(token).await? {
                Some(_) => Err(UpdateDraftError::AlreadyConfirmed),
                None => Err(UpdateDraftError::NotFound),
            },
        }
    }

    /// Claim the right to send the outcome notification for a draft.
    ///
    /// Check-and-set in one statement: exactly one of any number of
    /// concurrent dispatch attempts observes the false→true transition and
    /// gets to send.
    pub async fn claim_response_pending(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("claim_draft_response");
        let result = sqlx::query(
            r#"
            UPDATE draft_registrations
            SET response_sent = TRUE, updated_at = NOW()
            WHERE id = $1 AND response_sent = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected() == 1)
    }

    /// Confirm a draft, materializing its event exactly once.
    ///
    /// The draft row is locked for the duration of the transaction. A draft
    /// that already carries an event reference returns it unchanged, so a
    /// double-submitted confirm is a no-op. Email-derived events are filed
    /// under the named fallback group, created on demand.
    pub async fn confirm(
        &self,
        token: &str,
        fallback_group_name: &str,
        fallback_group_color: &str,
    ) -> Result<ConfirmOutcome, ConfirmError> {
        let timer = QueryTimer::new("confirm_draft");

        let mut tx = self.pool.begin().await.map_err(ConfirmError::Db)?;

        let draft = sqlx::query_as::<_, DraftRegistrationEntity>(&format!(
            r#"
            SELECT {DRAFT_COLUMNS}
            FROM draft_registrations
            WHERE access_token = $1
            FOR UPDATE
            "#,
        ))
        .bind(token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ConfirmError::Db)?
        .ok_or(ConfirmError::NotFound)?;

        if let Some(event_id) = draft.event_id {
            timer.record();
            return Ok(ConfirmOutcome {
                event_id,
                newly_materialized: false,
            });
        }

        let fields = draft.resolved_fields().map_err(ConfirmError::Incomplete)?;

        let group_id =
            GroupRepository::ensure_by_name(&mut tx, fallback_group_name, fallback_group_color)
                .await
                .map_err(ConfirmError::Db)?;

        let event = EventRepository::materialize(&mut tx, &fields, group_id, &[])
            .await
            .map_err(ConfirmError::Db)?;

        sqlx::query(
            r#"
            UPDATE draft_registrations
            SET event_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(draft.id)
        .bind(event.id)
        .execute(&mut *tx)
        .await
        .map_err(ConfirmError::Db)?;

        tx.commit().await.map_err(ConfirmError::Db)?;
        timer.record();

        Ok(ConfirmOutcome {
            event_id: event.id,
            newly_materialized: true,
        })
    }
}
