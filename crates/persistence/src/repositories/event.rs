//! Event repository and the materialization choke point.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use domain::models::event::{ListEventsQuery, ResolvedEventFields};
use domain::models::inventory::InventoryRequest;

use crate::entities::{EventAllocationEntity, EventEntity};
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str = "id, title, description, location, starts_at, ends_at, all_day, \
                             group_id, label, assignees, notes, teacher, created_at, updated_at";

/// Repository for event-related database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the event a registration resolves to, with its allocations.
    ///
    /// This is the single choke point both registration kinds funnel
    /// through. It runs inside the caller's transaction; the caller is
    /// responsible for checking the registration's event reference first
    /// (idempotency) and for setting it from the returned row afterwards,
    /// all within the same transaction.
    pub async fn materialize(
        tx: &mut Transaction<'_, Postgres>,
        fields: &ResolvedEventFields,
        group_id: Uuid,
        allocations: &[InventoryRequest],
    ) -> Result<EventEntity, sqlx::Error> {
        let event = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO events (title, description, location, starts_at, ends_at, all_day, group_id, label)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#,
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.starts_at)
        .bind(fields.ends_at)
        .bind(fields.all_day)
        .bind(group_id)
        .bind(&fields.label)
        .fetch_one(&mut **tx)
        .await?;

        for allocation in allocations {
            sqlx::query(
                r#"
                INSERT INTO event_inventory (event_id, item_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(event.id)
            .bind(allocation.item_id)
            .bind(allocation.quantity)
            .execute(&mut **tx)
            .await?;
        }

        Ok(event)
    }

    /// List events, optionally filtered by group and time window.
    pub async fn list(&self, query: &ListEventsQuery) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE ($1::uuid IS NULL OR group_id = $1)
              AND ($2::timestamptz IS NULL OR ends_at >= $2)
              AND ($3::timestamptz IS NULL OR starts_at <= $3)
            ORDER BY starts_at
            "#,
        ))
        .bind(query.group_id)
        .bind(query.from)
        .bind(query.to)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Inventory allocated to an event, with item names.
    pub async fn allocations(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<EventAllocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_allocations");
        let result = sqlx::query_as::<_, EventAllocationEntity>(
            r#"
            SELECT ei.item_id, i.name AS item_name, ei.quantity
            FROM event_inventory ei
            JOIN inventory_items i ON ei.item_id = i.id
            WHERE ei.event_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
