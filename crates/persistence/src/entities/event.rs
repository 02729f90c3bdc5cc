//! Calendar event entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::event::{CalendarEvent, EventAllocation};

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub all_day: bool,
    pub group_id: Uuid,
    pub label: Option<String>,
    pub assignees: Vec<String>,
    pub notes: Option<String>,
    pub teacher: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventEntity> for CalendarEvent {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
            all_day: entity.all_day,
            group_id: entity.group_id,
            label: entity.label,
            assignees: entity.assignees,
            notes: entity.notes,
            teacher: entity.teacher,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for event_inventory joined with item names.
#[derive(Debug, Clone, FromRow)]
pub struct EventAllocationEntity {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
}

impl From<EventAllocationEntity> for EventAllocation {
    fn from(entity: EventAllocationEntity) -> Self {
        Self {
            item_id: entity.item_id,
            item_name: entity.item_name,
            quantity: entity.quantity,
        }
    }
}
