//! Draft registration entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::draft::{DraftRegistration, DraftView, ExtractionStatus};
use domain::models::event::{RegistrationSource, RequiredField, ResolvedEventFields};
use domain::models::inventory::InventoryRequest;

/// Database enum for extraction_status that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "extraction_status", rename_all = "snake_case")]
pub enum ExtractionStatusDb {
    Awaiting,
    Succeeded,
    MissingData,
    Failed,
}

impl From<ExtractionStatusDb> for ExtractionStatus {
    fn from(db_status: ExtractionStatusDb) -> Self {
        match db_status {
            ExtractionStatusDb::Awaiting => ExtractionStatus::Awaiting,
            ExtractionStatusDb::Succeeded => ExtractionStatus::Succeeded,
            ExtractionStatusDb::MissingData => ExtractionStatus::MissingData,
            ExtractionStatusDb::Failed => ExtractionStatus::Failed,
        }
    }
}

impl From<ExtractionStatus> for ExtractionStatusDb {
    fn from(status: ExtractionStatus) -> Self {
        match status {
            ExtractionStatus::Awaiting => ExtractionStatusDb::Awaiting,
            ExtractionStatus::Succeeded => ExtractionStatusDb::Succeeded,
            ExtractionStatus::MissingData => ExtractionStatusDb::MissingData,
            ExtractionStatus::Failed => ExtractionStatusDb::Failed,
        }
    }
}

/// Database row mapping for the draft_registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct DraftRegistrationEntity {
    pub id: Uuid,
    pub email_id: Uuid,
    pub access_token: String,
    pub extraction_status: ExtractionStatusDb,
    pub missing_fields: Vec<String>,
    pub extraction_error: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub label: Option<String>,
    pub event_id: Option<Uuid>,
    pub response_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftRegistrationEntity {
    /// True once an event has been materialized from this draft.
    pub fn is_confirmed(&self) -> bool {
        self.event_id.is_some()
    }

    fn parsed_missing_fields(&self) -> Vec<RequiredField> {
        self.missing_fields
            .iter()
            .filter_map(|name| match name.as_str() {
                "title" => Some(RequiredField::Title),
                "start" => Some(RequiredField::Start),
                "end" => Some(RequiredField::End),
                _ => None,
            })
            .collect()
    }
}

impl RegistrationSource for DraftRegistrationEntity {
    fn resolved_fields(&self) -> Result<ResolvedEventFields, Vec<RequiredField>> {
        domain::models::event::resolve_fields(
            self.title.as_deref(),
            self.description.as_deref(),
            self.location.as_deref(),
            self.starts_at,
            self.ends_at,
            self.all_day,
            self.label.as_deref(),
        )
    }

    fn requested_inventory(&self) -> &[InventoryRequest] {
        // Email-derived drafts never request inventory.
        &[]
    }
}

impl From<DraftRegistrationEntity> for DraftRegistration {
    fn from(entity: DraftRegistrationEntity) -> Self {
        let missing_fields = entity.parsed_missing_fields();
        Self {
            id: entity.id,
            email_id: entity.email_id,
            access_token: entity.access_token,
            extraction_status: entity.extraction_status.into(),
            missing_fields,
            extraction_error: entity.extraction_error,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
            all_day: entity.all_day,
            label: entity.label,
            event_id: entity.event_id,
            response_sent: entity.response_sent,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<DraftRegistrationEntity> for DraftView {
    fn from(entity: DraftRegistrationEntity) -> Self {
        let missing_fields = entity.parsed_missing_fields();
        Self {
            extraction_status: entity.extraction_status.into(),
            missing_fields,
            extraction_error: entity.extraction_error,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
            all_day: entity.all_day,
            label: entity.label,
            confirmed: entity.event_id.is_some(),
            event_id: entity.event_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entity() -> DraftRegistrationEntity {
        DraftRegistrationEntity {
            id: Uuid::new_v4(),
            email_id: Uuid::new_v4(),
            access_token: "token".to_string(),
            extraction_status: ExtractionStatusDb::Succeeded,
            missing_fields: vec![],
            extraction_error: None,
            title: Some("Robotics workshop".to_string()),
            description: None,
            location: Some("Room 4".to_string()),
            starts_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap()),
            ends_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap()),
            all_day: None,
            label: None,
            event_id: None,
            response_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_resolved_fields_complete() {
        let fields = entity().resolved_fields().unwrap();
        assert_eq!(fields.title, "Robotics workshop");
        assert!(!fields.all_day);
    }

    #[test]
    fn test_resolved_fields_missing() {
        let mut draft = entity();
        draft.starts_at = None;
        draft.ends_at = None;
        let missing = draft.resolved_fields().unwrap_err();
        assert_eq!(missing, vec![RequiredField::Start, RequiredField::End]);
    }

    #[test]
    fn test_drafts_request_no_inventory() {
        assert!(entity().requested_inventory().is_empty());
    }

    #[test]
    fn test_view_conversion_parses_missing_fields() {
        let mut draft = entity();
        draft.extraction_status = ExtractionStatusDb::MissingData;
        draft.missing_fields = vec!["start".to_string(), "end".to_string(), "bogus".to_string()];
        let view: DraftView = draft.into();
        assert_eq!(
            view.missing_fields,
            vec![RequiredField::Start, RequiredField::End]
        );
        assert!(!view.confirmed);
    }
}
