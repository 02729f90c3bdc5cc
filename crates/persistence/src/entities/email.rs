//! Inbound email entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the inbound_emails table.
///
/// Rows are immutable after insert except for the `processed` flag; the raw
/// message is never deleted by the pipeline.
#[derive(Debug, Clone, FromRow)]
pub struct InboundEmailEntity {
    pub id: Uuid,
    pub from_address: String,
    pub to_address: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
    pub message_id: String,
    pub processed: bool,
    pub received_at: DateTime<Utc>,
}

impl From<InboundEmailEntity> for domain::models::email::InboundEmail {
    fn from(entity: InboundEmailEntity) -> Self {
        Self {
            id: entity.id,
            from_address: entity.from_address,
            to_address: entity.to_address,
            subject: entity.subject,
            text_body: entity.text_body,
            html_body: entity.html_body,
            message_id: entity.message_id,
            processed: entity.processed,
            received_at: entity.received_at,
        }
    }
}
