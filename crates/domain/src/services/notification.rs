//! Outbound notification templates for draft registrations.
//!
//! One of three fixed templates is selected by the extraction outcome:
//! success, missing-data (listing the field names still needed), or failure
//! (carrying the extraction error). Every variant embeds the guest link so
//! the sender can review, complete, and confirm the draft. Rendering is
//! pure; delivery and the send-once gate live with the caller.

use chrono::{DateTime, Utc};

use crate::models::draft::{DraftRegistration, ExtractionStatus};

/// A rendered outbound email.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeEmail {
    pub subject: String,
    pub body_text: String,
}

/// Inputs for rendering an outcome notification.
#[derive(Debug, Clone)]
pub struct NotificationContext<'a> {
    pub draft: &'a DraftRegistration,
    /// Full guest URL embedding the capability token.
    pub guest_link: &'a str,
    /// Original email subject, used as a fallback title in copy.
    pub email_subject: &'a str,
}

/// Render the notification for a draft's extraction outcome.
///
/// Drafts still awaiting extraction have no outcome to announce; callers
/// dispatch only after classification has been recorded.
pub fn render_outcome_email(ctx: &NotificationContext<'_>) -> OutcomeEmail {
    match ctx.draft.extraction_status {
        ExtractionStatus::Succeeded | ExtractionStatus::Awaiting => render_success(ctx),
        ExtractionStatus::MissingData => render_missing_data(ctx),
        ExtractionStatus::Failed => render_failure(ctx),
    }
}

fn display_title(ctx: &NotificationContext<'_>) -> String {
    ctx.draft
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| {
            if ctx.email_subject.trim().is_empty() {
                "your event request".to_string()
            } else {
                ctx.email_subject.trim().to_string()
            }
        })
}

fn format_instant(at: DateTime<Utc>, all_day: bool) -> String {
    if all_day {
        at.format("%Y-%m-%d").to_string()
    } else {
        at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

fn known_fields_block(ctx: &NotificationContext<'_>) -> String {
    let draft = ctx.draft;
    let all_day = draft.all_day.unwrap_or(false);
    let mut lines = Vec::new();
    if let Some(title) = &draft.title {
        lines.push(format!("  Title:    {}", title));
    }
    if let Some(starts_at) = draft.starts_at {
        lines.push(format!("  Starts:   {}", format_instant(starts_at, all_day)));
    }
    if let Some(ends_at) = draft.ends_at {
        lines.push(format!("  Ends:     {}", format_instant(ends_at, all_day)));
    }
    if let Some(location) = &draft.location {
        lines.push(format!("  Location: {}", location));
    }
    lines.join("\n")
}

fn render_success(ctx: &NotificationContext<'_>) -> OutcomeEmail {
    let title = display_title(ctx);
    let body_text = format!(
        r#"Hello,

We received your event request "{title}" and understood the following details:

{fields}

Please review them, adjust anything that is off, and confirm the event here:

{link}

Nothing is scheduled until you confirm.

Best regards,
The Eventdesk Team"#,
        title = title,
        fields = known_fields_block(ctx),
        link = ctx.guest_link,
    );

    OutcomeEmail {
        subject: format!("Please confirm your event request: {}", title),
        body_text,
    }
}

fn render_missing_data(ctx: &NotificationContext<'_>) -> OutcomeEmail {
    let title = display_title(ctx);
    let missing: Vec<&str> = ctx
        .draft
        .missing_fields
        .iter()
        .map(|f| f.as_str())
        .collect();
    let known = known_fields_block(ctx);
    let known_block = if known.is_empty() {
        String::new()
    } else {
        format!("So far we have:\n\n{}\n\n", known)
    };

    let body_text = format!(
        r#"Hello,

We received your event request "{title}" but could not work out everything
needed to schedule it. Still missing: {missing}.

{known_block}Please fill in the missing details and confirm the event here:

{link}

Best regards,
The Eventdesk Team"#,
        title = title,
        missing = missing.join(", "),
        known_block = known_block,
        link = ctx.guest_link,
    );

    OutcomeEmail {
        subject: format!("More details needed for your event request: {}", title),
        body_text,
    }
}

fn render_failure(ctx: &NotificationContext<'_>) -> OutcomeEmail {
    let title = display_title(ctx);
    let error = ctx
        .draft
        .extraction_error
        .as_deref()
        .unwrap_or("The request could not be read automatically");

    let body_text = format!(
        r#"Hello,

We received your event request "{title}" but could not process it
automatically ({error}).

You can still enter the event details yourself and confirm it here:

{link}

Best regards,
The Eventdesk Team"#,
        title = title,
        error = error,
        link = ctx.guest_link,
    );

    OutcomeEmail {
        subject: format!("We could not process your event request: {}", title),
        body_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::RequiredField;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn base_draft() -> DraftRegistration {
        DraftRegistration {
            id: Uuid::new_v4(),
            email_id: Uuid::new_v4(),
            access_token: "tok".to_string(),
            extraction_status: ExtractionStatus::Succeeded,
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
    fn test_success_template() {
        let draft = base_draft();
        let email = render_outcome_email(&NotificationContext {
            draft: &draft,
            guest_link: "https://cal.example/r/tok",
            email_subject: "Robotics workshop",
        });
        assert!(email.subject.contains("confirm"));
        assert!(email.subject.contains("Robotics workshop"));
        assert!(email.body_text.contains("Room 4"));
        assert!(email.body_text.contains("2025-03-01 14:00 UTC"));
        assert!(email.body_text.contains("https://cal.example/r/tok"));
    }

    #[test]
    fn test_missing_data_template_lists_fields() {
        let mut draft = base_draft();
        draft.extraction_status = ExtractionStatus::MissingData;
        draft.missing_fields = vec![RequiredField::Start, RequiredField::End];
        draft.starts_at = None;
        draft.ends_at = None;

        let email = render_outcome_email(&NotificationContext {
            draft: &draft,
            guest_link: "https://cal.example/r/tok",
            email_subject: "Robotics workshop",
        });
        assert!(email.subject.contains("More details needed"));
        assert!(email.body_text.contains("start, end"));
        assert!(email.body_text.contains("https://cal.example/r/tok"));
    }

    #[test]
    fn test_failure_template_carries_error() {
        let mut draft = base_draft();
        draft.extraction_status = ExtractionStatus::Failed;
        draft.extraction_error = Some("No usable title could be extracted".to_string());
        draft.title = None;

        let email = render_outcome_email(&NotificationContext {
            draft: &draft,
            guest_link: "https://cal.example/r/tok",
            email_subject: "Fwd: hello",
        });
        assert!(email.subject.contains("could not process"));
        assert!(email.subject.contains("Fwd: hello"));
        assert!(email
            .body_text
            .contains("No usable title could be extracted"));
        assert!(email.body_text.contains("https://cal.example/r/tok"));
    }

    #[test]
    fn test_all_day_formatting() {
        let mut draft = base_draft();
        draft.all_day = Some(true);
        let email = render_outcome_email(&NotificationContext {
            draft: &draft,
            guest_link: "https://cal.example/r/tok",
            email_subject: "",
        });
        assert!(email.body_text.contains("Starts:   2025-03-01\n"));
        assert!(!email.body_text.contains("14:00"));
    }

    #[test]
    fn test_fallback_title_from_subject() {
        let mut draft = base_draft();
        draft.title = None;
        draft.extraction_status = ExtractionStatus::Failed;
        let email = render_outcome_email(&NotificationContext {
            draft: &draft,
            guest_link: "https://cal.example/r/tok",
            email_subject: "  Sommerfest  ",
        });
        assert!(email.subject.contains("Sommerfest"));
    }
}
