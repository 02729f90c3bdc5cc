//! Group domain models.
//!
//! Groups partition the calendar for display; every event belongs to exactly
//! one group and is deleted with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

lazy_static::lazy_static! {
    static ref HEX_COLOR_REGEX: regex::Regex =
        regex::Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// A calendar group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    /// Display color in #RRGGBB form (default applied when omitted).
    #[validate(regex(
        path = *HEX_COLOR_REGEX,
        message = "Color must be a #RRGGBB hex value"
    ))]
    pub color: Option<String>,
}

/// Response for listing groups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsResponse {
    pub data: Vec<Group>,
    pub count: usize,
}

/// Response when deleting a group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DeleteGroupResponse {
    pub deleted: bool,
    pub group_id: Uuid,
    /// Events removed by the cascade.
    pub events_deleted: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_group_request_validation() {
        let valid = CreateGroupRequest {
            name: "Robotics Club".to_string(),
            color: Some("#2563eb".to_string()),
        };
        assert!(valid.validate().is_ok());

        let no_color = CreateGroupRequest {
            name: "Robotics Club".to_string(),
            color: None,
        };
        assert!(no_color.validate().is_ok());

        let empty_name = CreateGroupRequest {
            name: String::new(),
            color: None,
        };
        assert!(empty_name.validate().is_err());

        let bad_color = CreateGroupRequest {
            name: "Robotics Club".to_string(),
            color: Some("blue".to_string()),
        };
        assert!(bad_color.validate().is_err());

        let short_hex = CreateGroupRequest {
            name: "Robotics Club".to_string(),
            color: Some("#fff".to_string()),
        };
        assert!(short_hex.validate().is_err());
    }
}
