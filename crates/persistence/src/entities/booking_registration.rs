//! Booking registration entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::booking::{BookingRegistration, BookingStatus};
use domain::models::event::{RegistrationSource, RequiredField, ResolvedEventFields};
use domain::models::inventory::InventoryRequest;

/// Database enum for booking_status that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<BookingStatusDb> for BookingStatus {
    fn from(db_status: BookingStatusDb) -> Self {
        match db_status {
            BookingStatusDb::Pending => BookingStatus::Pending,
            BookingStatusDb::Approved => BookingStatus::Approved,
            BookingStatusDb::Rejected => BookingStatus::Rejected,
        }
    }
}

impl From<BookingStatus> for BookingStatusDb {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => BookingStatusDb::Pending,
            BookingStatus::Approved => BookingStatusDb::Approved,
            BookingStatus::Rejected => BookingStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the booking_registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRegistrationEntity {
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
    pub status: BookingStatusDb,
    pub decision_note: Option<String>,
    pub event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl BookingRegistrationEntity {
    /// True once the registration has been approved or rejected.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, BookingStatusDb::Pending)
    }

    /// Build the domain model, attaching the registration's inventory requests.
    pub fn into_model(self, requests: Vec<InventoryRequest>) -> BookingRegistration {
        BookingRegistration {
            id: self.id,
            requester_name: self.requester_name,
            requester_email: self.requester_email,
            title: self.title,
            description: self.description,
            location: self.location,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            all_day: self.all_day,
            label: self.label,
            group_id: self.group_id,
            status: self.status.into(),
            decision_note: self.decision_note,
            event_id: self.event_id,
            inventory_requests: requests,
            created_at: self.created_at,
            updated_at: self.updated_at,
            decided_at: self.decided_at,
        }
    }
}

/// Database row mapping for the booking_inventory_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct BookingInventoryRequestEntity {
    pub booking_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
}

impl From<&BookingInventoryRequestEntity> for InventoryRequest {
    fn from(entity: &BookingInventoryRequestEntity) -> Self {
        InventoryRequest {
            item_id: entity.item_id,
            quantity: entity.quantity,
        }
    }
}

/// A booking together with its inventory requests, viewed through the shared
/// materialization seam.
#[derive(Debug)]
pub struct BookingSource<'a> {
    pub booking: &'a BookingRegistrationEntity,
    pub requests: &'a [InventoryRequest],
}

impl RegistrationSource for BookingSource<'_> {
    fn resolved_fields(&self) -> Result<ResolvedEventFields, Vec<RequiredField>> {
        domain::models::event::resolve_fields(
            Some(&self.booking.title),
            self.booking.description.as_deref(),
            self.booking.location.as_deref(),
            self.booking.starts_at,
            self.booking.ends_at,
            Some(self.booking.all_day),
            self.booking.label.as_deref(),
        )
    }

    fn requested_inventory(&self) -> &[InventoryRequest] {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entity() -> BookingRegistrationEntity {
        BookingRegistrationEntity {
            id: Uuid::new_v4(),
            requester_name: "Alex Doe".to_string(),
            requester_email: "alex@example.com".to_string(),
            title: "Sports hall booking".to_string(),
            description: None,
            location: Some("Sports hall".to_string()),
            starts_at: Some(Utc.with_ymd_and_hms(2025, 4, 12, 9, 0, 0).unwrap()),
            ends_at: Some(Utc.with_ymd_and_hms(2025, 4, 12, 11, 0, 0).unwrap()),
            all_day: false,
            label: None,
            group_id: None,
            status: BookingStatusDb::Pending,
            decision_note: None,
            event_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            decided_at: None,
        }
    }

    #[test]
    fn test_terminal_states() {
        let mut booking = entity();
        assert!(!booking.is_terminal());
        booking.status = BookingStatusDb::Approved;
        assert!(booking.is_terminal());
        booking.status = BookingStatusDb::Rejected;
        assert!(booking.is_terminal());
    }

    #[test]
    fn test_booking_source_resolves_fields() {
        let booking = entity();
        let requests = vec![InventoryRequest {
            item_id: Uuid::new_v4(),
            quantity: 2,
        }];
        let source = BookingSource {
            booking: &booking,
            requests: &requests,
        };
        let fields = source.resolved_fields().unwrap();
        assert_eq!(fields.title, "Sports hall booking");
        assert_eq!(source.requested_inventory().len(), 1);
    }

    #[test]
    fn test_booking_source_reports_missing_times() {
        let mut booking = entity();
        booking.starts_at = None;
        let source = BookingSource {
            booking: &booking,
            requests: &[],
        };
        let missing = source.resolved_fields().unwrap_err();
        assert_eq!(missing, vec![RequiredField::Start]);
    }

    #[test]
    fn test_into_model_carries_requests() {
        let booking = entity();
        let id = booking.id;
        let model = booking.into_model(vec![InventoryRequest {
            item_id: Uuid::new_v4(),
            quantity: 3,
        }]);
        assert_eq!(model.id, id);
        assert_eq!(model.status, BookingStatus::Pending);
        assert_eq!(model.inventory_requests.len(), 1);
    }
}
