//! Inbound email domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

lazy_static::lazy_static! {
    // Providers deliver message ids both bare and in RFC 5322 angle-bracket
    // form; the idempotency key must be the same either way.
    static ref ANGLE_MESSAGE_ID_REGEX: regex::Regex =
        regex::Regex::new(r"^<([^<>]+)>$").unwrap();
}

/// Inbound email webhook payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InboundEmailRequest {
    #[validate(length(min = 1, max = 320, message = "Sender is required"))]
    pub from: String,

    #[validate(length(min = 1, max = 320, message = "Recipient is required"))]
    pub to: String,

    #[validate(length(max = 500, message = "Subject must be at most 500 characters"))]
    #[serde(default)]
    pub subject: String,

    /// Plain-text body; extraction input.
    pub text: Option<String>,

    /// HTML body, stored verbatim.
    pub html: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Provider message id is required"))]
    pub message_id: String,
}

/// A stored inbound email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InboundEmail {
    pub id: Uuid,
    pub from_address: String,
    pub to_address: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
    pub message_id: String,
    pub processed: bool,
    pub received_at: DateTime<Utc>,
}

/// Response after ingesting an inbound email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestResponse {
    pub email_id: Uuid,
    /// True when this delivery was a retry of an already-ingested message.
    pub duplicate: bool,
}

/// Normalize a provider message id for use as the idempotency key.
///
/// Strips surrounding whitespace and a single RFC 5322 angle-bracket pair.
pub fn normalize_message_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match ANGLE_MESSAGE_ID_REGEX.captures(trimmed) {
        Some(captures) => captures[1].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_message_id_bare() {
        assert_eq!(normalize_message_id("abc123@mail.example"), "abc123@mail.example");
    }

    #[test]
    fn test_normalize_message_id_angle_brackets() {
        assert_eq!(
            normalize_message_id("<abc123@mail.example>"),
            "abc123@mail.example"
        );
    }

    #[test]
    fn test_normalize_message_id_whitespace() {
        assert_eq!(
            normalize_message_id("  <abc123@mail.example>\n"),
            "abc123@mail.example"
        );
    }

    #[test]
    fn test_normalize_message_id_unbalanced_brackets_kept() {
        assert_eq!(normalize_message_id("<abc123"), "<abc123");
    }

    #[test]
    fn test_inbound_email_request_validation() {
        let valid = InboundEmailRequest {
            from: "parent@example.com".to_string(),
            to: "events@school.example".to_string(),
            subject: "Robotics workshop".to_string(),
            text: Some("Robotics workshop, Room 4, 2025-03-01 14:00-16:00".to_string()),
            html: None,
            message_id: "m-1@provider".to_string(),
        };
        assert!(valid.validate().is_ok());

        let missing_message_id = InboundEmailRequest {
            message_id: String::new(),
            ..valid.clone()
        };
        assert!(missing_message_id.validate().is_err());

        let missing_sender = InboundEmailRequest {
            from: String::new(),
            ..valid
        };
        assert!(missing_sender.validate().is_err());
    }

    #[test]
    fn test_inbound_email_request_subject_defaults_empty() {
        let json = r#"{"from":"a@b.c","to":"d@e.f","message_id":"m-1"}"#;
        let req: InboundEmailRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.subject, "");
        assert!(req.text.is_none());
    }
}
