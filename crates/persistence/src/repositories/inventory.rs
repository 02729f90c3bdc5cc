//! Inventory ledger repository for database operations.
//!
//! All mutations of `quantity_available` go through the atomic statements in
//! this module: conditional decrements for reservation, plain increments for
//! release, and administrator stock updates. Reservation is all-or-nothing:
//! it either decrements every requested item inside the caller's transaction
//! or fails with the first shortfall, leaving nothing allocated once the
//! transaction rolls back.

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use domain::models::inventory::{Availability, InventoryRequest};

use crate::entities::InventoryItemEntity;
use crate::metrics::QueryTimer;

/// Errors from a reservation attempt.
#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("Insufficient inventory for item {item_id}: requested {requested}, available {available}")]
    Insufficient {
        item_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Repository for inventory ledger database operations.
#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an inventory item.
    pub async fn create(
        &self,
        name: &str,
        quantity_available: i32,
    ) -> Result<InventoryItemEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_inventory_item");
        let result = sqlx::query_as::<_, InventoryItemEntity>(
            r#"
            INSERT INTO inventory_items (name, quantity_available)
            VALUES ($1, $2)
            RETURNING id, name, quantity_available, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(quantity_available)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all items, alphabetically.
    pub async fn list(&self) -> Result<Vec<InventoryItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_inventory_items");
        let result = sqlx::query_as::<_, InventoryItemEntity>(
            r#"
            SELECT id, name, quantity_available, created_at, updated_at
            FROM inventory_items
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an item by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InventoryItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_inventory_item_by_id");
        let result = sqlx::query_as::<_, InventoryItemEntity>(
            r#"
            SELECT id, name, quantity_available, created_at, updated_at
            FROM inventory_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set an item's stock level (administrator restock/correction).
    pub async fn set_quantity(
        &self,
        id: Uuid,
        quantity_available: i32,
    ) -> Result<Option<InventoryItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_inventory_quantity");
        let result = sqlx::query_as::<_, InventoryItemEntity>(
            r#"
            UPDATE inventory_items
            SET quantity_available = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, quantity_available, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(quantity_available)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Answer whether every request could currently be satisfied.
    ///
    /// Advisory only: the authoritative check is the conditional decrement
    /// in [`Self::reserve`], which cannot race.
    pub async fn check_availability(
        &self,
        requests: &[InventoryRequest],
    ) -> Result<Availability, sqlx::Error> {
        let timer = QueryTimer::new("check_inventory_availability");
        for request in requests {
            let available: Option<i32> = sqlx::query_scalar(
                r#"
                SELECT quantity_available
                FROM inventory_items
                WHERE id = $1
                "#,
            )
            .bind(request.item_id)
            .fetch_optional(&self.pool)
            .await?;

            let available = available.unwrap_or(0);
            if available < request.quantity {
                timer.record();
                return Ok(Availability::Insufficient {
                    item_id: request.item_id,
                    requested: request.quantity,
                    available,
                });
            }
        }
        timer.record();
        Ok(Availability::Satisfied)
    }

    /// Atomically reserve every requested quantity, or nothing.
    ///
    /// Runs inside the caller's transaction. Each decrement is conditional
    /// on sufficient stock; the first miss aborts with `Insufficient` and
    /// the caller's rollback undoes any decrements already applied, so two
    /// approvals racing for the last unit resolve to exactly one winner.
    pub async fn reserve(
        tx: &mut Transaction<'_, Postgres>,
        requests: &[InventoryRequest],
    ) -> Result<(), ReserveError> {
        for request in requests {
            let updated = sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity_available = quantity_available - $2, updated_at = NOW()
                WHERE id = $1 AND quantity_available >= $2
                "#,
            )
            .bind(request.item_id)
            .bind(request.quantity)
            .execute(&mut **tx)
            .await?;

            if updated.rows_affected() == 0 {
                let available: Option<i32> = sqlx::query_scalar(
                    r#"
                    SELECT quantity_available
                    FROM inventory_items
                    WHERE id = $1
                    "#,
                )
                .bind(request.item_id)
                .fetch_optional(&mut **tx)
                .await?;

                return Err(ReserveError::Insufficient {
                    item_id: request.item_id,
                    requested: request.quantity,
                    available: available.unwrap_or(0),
                });
            }
        }
        Ok(())
    }

    /// Atomically return previously reserved quantities to the ledger.
    pub async fn release(
        tx: &mut Transaction<'_, Postgres>,
        requests: &[InventoryRequest],
    ) -> Result<(), sqlx::Error> {
        for request in requests {
            sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity_available = quantity_available + $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(request.item_id)
            .bind(request.quantity)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
