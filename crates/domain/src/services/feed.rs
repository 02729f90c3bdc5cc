//! iCalendar feed encoding.
//!
//! Downstream calendar clients subscribe to a read-only feed of confirmed
//! events. Encoding is a deterministic pure function over the event list:
//! one VEVENT per event inside a VCALENDAR envelope, RFC 5545 text escaping,
//! and 75-character line folding.

use chrono::{DateTime, Utc};

use crate::models::event::CalendarEvent;

const PRODID: &str = "-//Eventdesk//Calendar Feed//EN";

/// Escape a text value for an iCalendar content line.
///
/// Backslash, semicolon, comma, and newline are escaped; carriage returns
/// are dropped so CRLF input folds into a single escaped newline.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line at the 75-character boundary.
///
/// Inserts CRLF plus a single leading space at every boundary, repeatedly,
/// as long as the remainder is over-long.
pub fn fold_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= 75 {
        return line.to_string();
    }
    chars
        .chunks(75)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\r\n ")
}

fn format_utc(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d").to_string()
}

/// Encode one event as its VEVENT content lines (unfolded).
fn vevent_lines(event: &CalendarEvent, dtstamp: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@eventdesk", event.id),
        format!("DTSTAMP:{}", format_utc(dtstamp)),
    ];

    if event.all_day {
        lines.push(format!("DTSTART;VALUE=DATE:{}", format_date(event.starts_at)));
        lines.push(format!("DTEND;VALUE=DATE:{}", format_date(event.ends_at)));
    } else {
        lines.push(format!("DTSTART:{}", format_utc(event.starts_at)));
        lines.push(format!("DTEND:{}", format_utc(event.ends_at)));
    }

    lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
    if let Some(description) = &event.description {
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
    }
    if let Some(location) = &event.location {
        lines.push(format!("LOCATION:{}", escape_text(location)));
    }
    lines.push("STATUS:CONFIRMED".to_string());
    lines.push("SEQUENCE:0".to_string());
    lines.push("END:VEVENT".to_string());
    lines
}

/// Render the full calendar feed.
pub fn render_calendar(events: &[CalendarEvent], dtstamp: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
    ];
    for event in events {
        lines.extend(vevent_lines(event, dtstamp));
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold_line(&line));
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn event() -> CalendarEvent {
        CalendarEvent {
            id: Uuid::nil(),
            title: "Robotics workshop".to_string(),
            description: None,
            location: Some("Room 4".to_string()),
            starts_at: Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap(),
            all_day: false,
            group_id: Uuid::new_v4(),
            label: None,
            assignees: vec![],
            notes: None,
            teacher: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn dtstamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a;b,c\\d"), "a\\;b\\,c\\\\d");
        assert_eq!(escape_text("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_text("plain text"), "plain text");
    }

    #[test]
    fn test_fold_line_short_unchanged() {
        let line = "SUMMARY:Short";
        assert_eq!(fold_line(line), line);
        let exactly_75: String = "X".repeat(75);
        assert_eq!(fold_line(&exactly_75), exactly_75);
    }

    #[test]
    fn test_fold_line_long() {
        let line: String = "A".repeat(80);
        let folded = fold_line(&line);
        assert_eq!(folded, format!("{}\r\n {}", "A".repeat(75), "A".repeat(5)));
    }

    #[test]
    fn test_fold_line_repeats() {
        let line: String = "B".repeat(200);
        let folded = fold_line(&line);
        let segments: Vec<&str> = folded.split("\r\n ").collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 75);
        assert_eq!(segments[1].len(), 75);
        assert_eq!(segments[2].len(), 50);
    }

    #[test]
    fn test_vevent_timed() {
        let text = render_calendar(&[event()], dtstamp());
        assert!(text.contains("BEGIN:VEVENT\r\n"));
        assert!(text.contains("UID:00000000-0000-0000-0000-000000000000@eventdesk\r\n"));
        assert!(text.contains("DTSTAMP:20250201T083000Z\r\n"));
        assert!(text.contains("DTSTART:20250301T140000Z\r\n"));
        assert!(text.contains("DTEND:20250301T160000Z\r\n"));
        assert!(text.contains("SUMMARY:Robotics workshop\r\n"));
        assert!(text.contains("LOCATION:Room 4\r\n"));
        assert!(text.contains("STATUS:CONFIRMED\r\n"));
        assert!(text.contains("SEQUENCE:0\r\n"));
    }

    #[test]
    fn test_vevent_all_day() {
        let mut all_day = event();
        all_day.all_day = true;
        let text = render_calendar(&[all_day], dtstamp());
        assert!(text.contains("DTSTART;VALUE=DATE:20250301\r\n"));
        assert!(text.contains("DTEND;VALUE=DATE:20250301\r\n"));
        assert!(!text.contains("DTSTART:2025"));
    }

    #[test]
    fn test_calendar_envelope() {
        let text = render_calendar(&[], dtstamp());
        assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(text.contains("VERSION:2.0\r\n"));
        assert!(text.contains("PRODID:-//Eventdesk//Calendar Feed//EN\r\n"));
        assert!(text.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_summary_escaping_in_feed() {
        let mut tricky = event();
        tricky.title = "Lunch; soup, bread\nand more".to_string();
        let text = render_calendar(&[tricky], dtstamp());
        assert!(text.contains("SUMMARY:Lunch\\; soup\\, bread\\nand more\r\n"));
    }

    #[test]
    fn test_long_description_folds() {
        let mut verbose = event();
        verbose.description = Some("d".repeat(120));
        let text = render_calendar(&[verbose], dtstamp());
        let expected_first = format!("DESCRIPTION:{}", "d".repeat(75 - "DESCRIPTION:".len()));
        assert!(text.contains(&format!("{}\r\n d", expected_first)));
    }
}
