//! Inventory ledger domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A named countable resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub quantity_available: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A request to allocate some quantity of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InventoryRequest {
    pub item_id: Uuid,

    #[validate(custom(function = "shared::validation::validate_quantity"))]
    pub quantity: i32,
}

/// Outcome of an availability check or reservation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    Satisfied,
    Insufficient {
        item_id: Uuid,
        requested: i32,
        available: i32,
    },
}

impl Availability {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Availability::Satisfied)
    }
}

/// Request to create an inventory item.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInventoryItemRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity_available: i32,
}

/// Request to update an item's stock level.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateInventoryItemRequest {
    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity_available: i32,
}

/// Request body for an availability query.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AvailabilityQuery {
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<InventoryRequest>,
}

/// Response for listing inventory items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInventoryResponse {
    pub data: Vec<InventoryItem>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_satisfied() {
        let availability = Availability::Satisfied;
        assert!(availability.is_satisfied());
        let json = serde_json::to_string(&availability).unwrap();
        assert_eq!(json, r#"{"status":"satisfied"}"#);
    }

    #[test]
    fn test_availability_insufficient_serializes_shortfall() {
        let item_id = Uuid::new_v4();
        let availability = Availability::Insufficient {
            item_id,
            requested: 3,
            available: 1,
        };
        assert!(!availability.is_satisfied());
        let json = serde_json::to_value(&availability).unwrap();
        assert_eq!(json["status"], "insufficient");
        assert_eq!(json["requested"], 3);
        assert_eq!(json["available"], 1);
    }

    #[test]
    fn test_inventory_request_validation() {
        let valid = InventoryRequest {
            item_id: Uuid::new_v4(),
            quantity: 2,
        };
        assert!(valid.validate().is_ok());

        let zero = InventoryRequest {
            item_id: Uuid::new_v4(),
            quantity: 0,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_create_item_validation() {
        let valid = CreateInventoryItemRequest {
            name: "Projector".to_string(),
            quantity_available: 4,
        };
        assert!(valid.validate().is_ok());

        let negative = CreateInventoryItemRequest {
            name: "Projector".to_string(),
            quantity_available: -1,
        };
        assert!(negative.validate().is_err());

        let unnamed = CreateInventoryItemRequest {
            name: String::new(),
            quantity_available: 4,
        };
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_availability_query_requires_items() {
        let empty = AvailabilityQuery { items: vec![] };
        assert!(empty.validate().is_err());
    }
}
