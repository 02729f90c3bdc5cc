//! Inventory item entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::inventory::InventoryItem;

/// Database row mapping for the inventory_items table.
///
/// `quantity_available` is only ever changed through the ledger's atomic
/// reserve/release statements and administrator stock updates.
#[derive(Debug, Clone, FromRow)]
pub struct InventoryItemEntity {
    pub id: Uuid,
    pub name: String,
    pub quantity_available: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InventoryItemEntity> for InventoryItem {
    fn from(entity: InventoryItemEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            quantity_available: entity.quantity_available,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
