//! Calendar event domain models and the shared materialization seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inventory::InventoryRequest;

/// A field an event cannot be materialized without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredField {
    Title,
    Start,
    End,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Title => "title",
            RequiredField::Start => "start",
            RequiredField::End => "end",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The complete set of fields an event is created from.
///
/// Produced by [`RegistrationSource::resolved_fields`] once a registration
/// has everything materialization requires.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEventFields {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub all_day: bool,
    pub label: Option<String>,
}

/// Common view over the two registration kinds (email-derived drafts and
/// direct bookings) so both funnel through one materialization choke point.
pub trait RegistrationSource {
    /// Resolve the event fields, or report which required fields are missing.
    fn resolved_fields(&self) -> Result<ResolvedEventFields, Vec<RequiredField>>;

    /// Inventory the registration asks to allocate at approval time.
    fn requested_inventory(&self) -> &[InventoryRequest];
}

/// Resolve event fields from a registration's proposed values.
///
/// Shared by both registration kinds: title/start/end are required, the
/// rest pass through as-is.
pub fn resolve_fields(
    title: Option<&str>,
    description: Option<&str>,
    location: Option<&str>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    all_day: Option<bool>,
    label: Option<&str>,
) -> Result<ResolvedEventFields, Vec<RequiredField>> {
    let mut missing = Vec::new();
    if title.map(str::trim).filter(|t| !t.is_empty()).is_none() {
        missing.push(RequiredField::Title);
    }
    if starts_at.is_none() {
        missing.push(RequiredField::Start);
    }
    if ends_at.is_none() {
        missing.push(RequiredField::End);
    }
    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(ResolvedEventFields {
        title: title.unwrap().trim().to_string(),
        description: description.map(|s| s.to_string()),
        location: location.map(|s| s.to_string()),
        starts_at: starts_at.unwrap(),
        ends_at: ends_at.unwrap(),
        all_day: all_day.unwrap_or(false),
        label: label.map(|s| s.to_string()),
    })
}

/// A confirmed calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarEvent {
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

/// Allocated inventory attached to an event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventAllocation {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
}

/// Event detail including allocated inventory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub allocations: Vec<EventAllocation>,
}

/// Query parameters for listing events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListEventsQuery {
    pub group_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Response for listing events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListEventsResponse {
    pub data: Vec<CalendarEvent>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_resolve_fields_complete() {
        let (start, end) = window();
        let fields = resolve_fields(
            Some("Robotics workshop"),
            None,
            Some("Room 4"),
            Some(start),
            Some(end),
            None,
            None,
        )
        .unwrap();
        assert_eq!(fields.title, "Robotics workshop");
        assert_eq!(fields.location.as_deref(), Some("Room 4"));
        assert_eq!(fields.starts_at, start);
        assert_eq!(fields.ends_at, end);
        assert!(!fields.all_day);
    }

    #[test]
    fn test_resolve_fields_missing_times() {
        let missing = resolve_fields(Some("Workshop"), None, None, None, None, None, None)
            .unwrap_err();
        assert_eq!(missing, vec![RequiredField::Start, RequiredField::End]);
    }

    #[test]
    fn test_resolve_fields_blank_title_is_missing() {
        let (start, end) = window();
        let missing =
            resolve_fields(Some("   "), None, None, Some(start), Some(end), None, None)
                .unwrap_err();
        assert_eq!(missing, vec![RequiredField::Title]);
    }

    #[test]
    fn test_resolve_fields_trims_title() {
        let (start, end) = window();
        let fields = resolve_fields(
            Some("  Workshop  "),
            None,
            None,
            Some(start),
            Some(end),
            Some(true),
            Some("club"),
        )
        .unwrap();
        assert_eq!(fields.title, "Workshop");
        assert!(fields.all_day);
        assert_eq!(fields.label.as_deref(), Some("club"));
    }

    #[test]
    fn test_required_field_display() {
        assert_eq!(RequiredField::Title.to_string(), "title");
        assert_eq!(RequiredField::Start.to_string(), "start");
        assert_eq!(RequiredField::End.to_string(), "end");
    }
}
