//! Group repository for database operations.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::GroupEntity;
use crate::metrics::QueryTimer;

const GROUP_COLUMNS: &str = "id, name, color, created_at, updated_at";

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new group.
    pub async fn create(&self, name: &str, color: &str) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_group");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            INSERT INTO groups (name, color)
            VALUES ($1, $2)
            RETURNING {GROUP_COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all groups, alphabetically.
    pub async fn list(&self) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
            ORDER BY name
            "#,
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a group by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a group. Its events go with it (FK cascade).
    ///
    /// Returns `None` when the group does not exist, otherwise the number of
    /// events removed by the cascade.
    pub async fn delete(&self, id: Uuid) -> Result<Option<i64>, sqlx::Error> {
        let timer = QueryTimer::new("delete_group");

        let mut tx = self.pool.begin().await?;

        let events: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM events
            WHERE group_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();

        if deleted.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(events))
        }
    }

    /// Look up a group by name inside a transaction, creating it on demand.
    ///
    /// Used by the materializer to file email-derived events under the
    /// configured default group. The upsert makes concurrent first uses of
    /// the name converge on one row.
    pub async fn ensure_by_name(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        color: &str,
    ) -> Result<Uuid, sqlx::Error> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO groups (name, color)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET updated_at = groups.updated_at
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(color)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }
}
