//! Booking registration domain models.
//!
//! A booking registration is an event proposal submitted directly by a
//! requester and decided by an administrator. Approval is coupled to an
//! all-or-nothing inventory reservation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::inventory::InventoryRequest;

/// Status of a booking registration.
///
/// `pending` is the only non-terminal state; `approved` and `rejected` are
/// immutable once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    /// True once no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// A booking registration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BookingRegistration {
    pub id: Uuid,
    pub requester_name: String,
    pub requester_email: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub label: Option<String>,
    pub group_id: Option<Uuid>,
    pub status: BookingStatus,
    pub decision_note: Option<String>,
    pub event_id: Option<Uuid>,
    pub inventory_requests: Vec<InventoryRequest>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Request payload for submitting a booking.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_booking_times"))]
pub struct CreateBookingRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Requester name must be between 1 and 100 characters"
    ))]
    pub requester_name: String,

    #[validate(email(message = "Requester email must be a valid address"))]
    pub requester_email: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub all_day: bool,

    #[validate(length(max = 50, message = "Label must be at most 50 characters"))]
    pub label: Option<String>,

    /// Group to file the event under on approval (default group when omitted).
    pub group_id: Option<Uuid>,

    #[validate(nested)]
    #[serde(default)]
    pub inventory: Vec<InventoryRequest>,
}

fn validate_booking_times(req: &CreateBookingRequest) -> Result<(), validator::ValidationError> {
    shared::validation::validate_time_range(req.starts_at, req.ends_at)
}

/// Request to decide a pending booking (approve or reject).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct DecideBookingRequest {
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Response after deciding a booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DecideBookingResponse {
    pub id: Uuid,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    pub decided_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Pagination info for list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Query parameters for listing bookings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListBookingsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

/// Response for listing bookings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListBookingsResponse {
    pub data: Vec<BookingRegistration>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn valid_request() -> CreateBookingRequest {
        CreateBookingRequest {
            requester_name: Name().fake(),
            requester_email: SafeEmail().fake(),
            title: "Sports hall booking".to_string(),
            description: None,
            location: Some("Sports hall".to_string()),
            starts_at: Some(Utc.with_ymd_and_hms(2025, 4, 12, 9, 0, 0).unwrap()),
            ends_at: Some(Utc.with_ymd_and_hms(2025, 4, 12, 11, 0, 0).unwrap()),
            all_day: false,
            label: None,
            group_id: None,
            inventory: vec![InventoryRequest {
                item_id: Uuid::new_v4(),
                quantity: 2,
            }],
        }
    }

    #[test]
    fn test_booking_status_display() {
        assert_eq!(BookingStatus::Pending.to_string(), "pending");
        assert_eq!(BookingStatus::Approved.to_string(), "approved");
        assert_eq!(BookingStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_booking_status_from_str() {
        assert_eq!(
            BookingStatus::from_str("Pending").unwrap(),
            BookingStatus::Pending
        );
        assert_eq!(
            BookingStatus::from_str("APPROVED").unwrap(),
            BookingStatus::Approved
        );
        assert!(BookingStatus::from_str("expired").is_err());
    }

    #[test]
    fn test_booking_status_terminal() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(BookingStatus::Approved.is_terminal());
        assert!(BookingStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_create_booking_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_create_booking_request_requires_title() {
        let request = CreateBookingRequest {
            title: String::new(),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_booking_request_rejects_bad_email() {
        let request = CreateBookingRequest {
            requester_email: "not-an-address".to_string(),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_booking_request_rejects_inverted_times() {
        let request = CreateBookingRequest {
            starts_at: Some(Utc.with_ymd_and_hms(2025, 4, 12, 11, 0, 0).unwrap()),
            ends_at: Some(Utc.with_ymd_and_hms(2025, 4, 12, 9, 0, 0).unwrap()),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_booking_request_rejects_zero_quantity() {
        let request = CreateBookingRequest {
            inventory: vec![InventoryRequest {
                item_id: Uuid::new_v4(),
                quantity: 0,
            }],
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_booking_request_times_optional() {
        let request = CreateBookingRequest {
            starts_at: None,
            ends_at: None,
            ..valid_request()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListBookingsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 20);
        assert!(query.status.is_none());
    }
}
