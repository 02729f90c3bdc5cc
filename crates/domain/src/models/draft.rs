//! Draft registration domain models.
//!
//! A draft registration is an event proposal derived from an inbound email.
//! It is reachable only through its capability token, editable until
//! confirmed, and terminal once an event has been materialized from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::event::RequiredField;

/// Extraction lifecycle of a draft registration.
///
/// `awaiting → {succeeded, missing_data, failed}`; confirmation is tracked
/// separately through the materialized event reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Awaiting,
    Succeeded,
    MissingData,
    Failed,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Awaiting => "awaiting",
            ExtractionStatus::Succeeded => "succeeded",
            ExtractionStatus::MissingData => "missing_data",
            ExtractionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExtractionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting" => Ok(ExtractionStatus::Awaiting),
            "succeeded" => Ok(ExtractionStatus::Succeeded),
            "missing_data" => Ok(ExtractionStatus::MissingData),
            "failed" => Ok(ExtractionStatus::Failed),
            _ => Err(format!("Invalid extraction status: {}", s)),
        }
    }
}

/// A draft registration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DraftRegistration {
    pub id: Uuid,
    pub email_id: Uuid,
    pub access_token: String,
    pub extraction_status: ExtractionStatus,
    pub missing_fields: Vec<RequiredField>,
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

/// Guest-facing view of a draft, resolved by capability token.
///
/// Deliberately omits the owning email and notification bookkeeping.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DraftView {
    pub extraction_status: ExtractionStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<RequiredField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub label: Option<String>,
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
}

/// Field-level patch applied by the guest.
///
/// Absent fields are left untouched; patching never changes status.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_update_times"))]
pub struct UpdateDraftRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,

    #[validate(length(max = 50, message = "Label must be at most 50 characters"))]
    pub label: Option<String>,
}

impl UpdateDraftRequest {
    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.starts_at.is_none()
            && self.ends_at.is_none()
            && self.all_day.is_none()
            && self.label.is_none()
    }
}

fn validate_update_times(req: &UpdateDraftRequest) -> Result<(), validator::ValidationError> {
    shared::validation::validate_time_range(req.starts_at, req.ends_at)
}

/// Response after confirming a draft.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfirmDraftResponse {
    pub event_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extraction_status_round_trip() {
        for status in [
            ExtractionStatus::Awaiting,
            ExtractionStatus::Succeeded,
            ExtractionStatus::MissingData,
            ExtractionStatus::Failed,
        ] {
            assert_eq!(
                ExtractionStatus::from_str(status.as_str()).unwrap(),
                status
            );
        }
        assert!(ExtractionStatus::from_str("confirmed").is_err());
    }

    #[test]
    fn test_update_request_empty() {
        let patch = UpdateDraftRequest::default();
        assert!(patch.is_empty());

        let patch = UpdateDraftRequest {
            title: Some("Workshop".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_update_request_time_range_validation() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();

        let inverted = UpdateDraftRequest {
            starts_at: Some(start),
            ends_at: Some(end),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let ordered = UpdateDraftRequest {
            starts_at: Some(end),
            ends_at: Some(start),
            ..Default::default()
        };
        assert!(ordered.validate().is_ok());
    }

    #[test]
    fn test_update_request_partial_times_ok() {
        let patch = UpdateDraftRequest {
            starts_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_draft_view_hides_empty_diagnostics() {
        let view = DraftView {
            extraction_status: ExtractionStatus::Succeeded,
            missing_fields: vec![],
            extraction_error: None,
            title: Some("Workshop".to_string()),
            description: None,
            location: None,
            starts_at: None,
            ends_at: None,
            all_day: None,
            label: None,
            confirmed: false,
            event_id: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("missing_fields").is_none());
        assert!(json.get("extraction_error").is_none());
        assert_eq!(json["confirmed"], false);
    }
}
