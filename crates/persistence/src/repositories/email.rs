//! Inbound email repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::InboundEmailEntity;
use crate::metrics::QueryTimer;

/// Repository for inbound email database operations.
#[derive(Clone)]
pub struct EmailRepository {
    pool: PgPool,
}

impl EmailRepository {
    /// Creates a new EmailRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store an inbound email, deduplicating on the provider message id.
    ///
    /// Returns the stored (or previously stored) row plus a flag telling
    /// whether this delivery was a duplicate. The insert and the duplicate
    /// detection are one statement, so two racing deliveries of the same
    /// message resolve to exactly one row.
    pub async fn ingest(
        &self,
        from_address: &str,
        to_address: &str,
        subject: &str,
        text_body: Option<&str>,
        html_body: Option<&str>,
        message_id: &str,
    ) -> Result<(InboundEmailEntity, bool), sqlx::Error> {
        let timer = QueryTimer::new("ingest_email");
        let inserted = sqlx::query_as::<_, InboundEmailEntity>(
            r#"
            INSERT INTO inbound_emails (from_address, to_address, subject, text_body, html_body, message_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (message_id) DO NOTHING
            RETURNING id, from_address, to_address, subject, text_body, html_body, message_id, processed, received_at
            "#,
        )
        .bind(from_address)
        .bind(to_address)
        .bind(subject)
        .bind(text_body)
        .bind(html_body)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        match inserted? {
            Some(entity) => Ok((entity, false)),
            None => {
                let existing = self
                    .find_by_message_id(message_id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((existing, true))
            }
        }
    }

    /// Find an email by provider message id.
    pub async fn find_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<InboundEmailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_email_by_message_id");
        let result = sqlx::query_as::<_, InboundEmailEntity>(
            r#"
            SELECT id, from_address, to_address, subject, text_body, html_body, message_id, processed, received_at
            FROM inbound_emails
            WHERE message_id = $1
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an email by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InboundEmailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_email_by_id");
        let result = sqlx::query_as::<_, InboundEmailEntity>(
            r#"
            SELECT id, from_address, to_address, subject, text_body, html_body, message_id, processed, received_at
            FROM inbound_emails
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark an email as processed once extraction has run to completion.
    pub async fn mark_processed(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_email_processed");
        let result = sqlx::query(
            r#"
            UPDATE inbound_emails
            SET processed = TRUE
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
