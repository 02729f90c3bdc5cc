//! Event extraction collaborator seam and outcome classification.
//!
//! The extraction capability itself is external and opaque: it receives the
//! plain-text email body and returns a structured result or an error, with
//! unspecified latency. The core only depends on the [`Extractor`] trait so
//! the pipeline is testable with a deterministic fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::event::RequiredField;

/// Structured result of extracting an event proposal from free text.
///
/// Every field is optional; classification decides what the partial shape
/// means for the draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtractedEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
}

/// Errors reported by the extraction collaborator.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Extraction capability not configured")]
    NotConfigured,

    #[error("Extraction service unavailable: {0}")]
    Unavailable(String),

    #[error("Extraction failed: {0}")]
    Failed(String),
}

/// The opaque extraction capability.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<ExtractedEvent, ExtractionError>;
}

/// Outcome of one extraction attempt, as recorded on the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Title, start and end all resolved.
    Succeeded { fields: ExtractedEvent },
    /// Title resolved but the draft cannot be confirmed yet.
    MissingData {
        fields: ExtractedEvent,
        missing: Vec<RequiredField>,
    },
    /// The collaborator errored or produced no usable title.
    Failed { error: String },
}

/// Classify an extraction result into the draft outcome.
///
/// Success requires title, start and end. A usable title with either time
/// missing is a missing-data outcome listing the absent required fields.
/// Anything without a usable title is a failure.
pub fn classify_extraction(
    result: Result<ExtractedEvent, ExtractionError>,
) -> ExtractionOutcome {
    let fields = match result {
        Ok(fields) => fields,
        Err(err) => {
            return ExtractionOutcome::Failed {
                error: err.to_string(),
            }
        }
    };

    let has_title = fields
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .is_some();
    if !has_title {
        return ExtractionOutcome::Failed {
            error: "No usable title could be extracted".to_string(),
        };
    }

    let mut missing = Vec::new();
    if fields.start.is_none() {
        missing.push(RequiredField::Start);
    }
    if fields.end.is_none() {
        missing.push(RequiredField::End);
    }

    if missing.is_empty() {
        ExtractionOutcome::Succeeded { fields }
    } else {
        ExtractionOutcome::MissingData { fields, missing }
    }
}

/// Deterministic extractor returning a preset result, for tests and
/// development environments without the external capability.
#[derive(Debug, Clone)]
pub struct FixedExtractor {
    result: Result<ExtractedEvent, ExtractionError>,
}

impl FixedExtractor {
    pub fn succeeding(fields: ExtractedEvent) -> Self {
        Self { result: Ok(fields) }
    }

    pub fn failing(error: ExtractionError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl Extractor for FixedExtractor {
    async fn extract(&self, _text: &str) -> Result<ExtractedEvent, ExtractionError> {
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_fields() -> ExtractedEvent {
        ExtractedEvent {
            title: Some("Robotics workshop".to_string()),
            description: None,
            location: Some("Room 4".to_string()),
            start: Some(Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap()),
            all_day: None,
        }
    }

    #[test]
    fn test_classify_success() {
        let outcome = classify_extraction(Ok(full_fields()));
        match outcome {
            ExtractionOutcome::Succeeded { fields } => {
                assert_eq!(fields.title.as_deref(), Some("Robotics workshop"));
            }
            other => panic!("Expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_missing_location_is_still_success() {
        let fields = ExtractedEvent {
            location: None,
            ..full_fields()
        };
        assert!(matches!(
            classify_extraction(Ok(fields)),
            ExtractionOutcome::Succeeded { .. }
        ));
    }

    #[test]
    fn test_classify_missing_times() {
        let fields = ExtractedEvent {
            title: Some("Spring concert".to_string()),
            ..Default::default()
        };
        match classify_extraction(Ok(fields)) {
            ExtractionOutcome::MissingData { missing, .. } => {
                assert_eq!(missing, vec![RequiredField::Start, RequiredField::End]);
            }
            other => panic!("Expected missing data, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_missing_end_only() {
        let fields = ExtractedEvent {
            end: None,
            ..full_fields()
        };
        match classify_extraction(Ok(fields)) {
            ExtractionOutcome::MissingData { missing, .. } => {
                assert_eq!(missing, vec![RequiredField::End]);
            }
            other => panic!("Expected missing data, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_no_title_is_failure() {
        let fields = ExtractedEvent {
            title: Some("  ".to_string()),
            ..full_fields()
        };
        assert!(matches!(
            classify_extraction(Ok(fields)),
            ExtractionOutcome::Failed { .. }
        ));
    }

    #[test]
    fn test_classify_collaborator_error_is_failure() {
        let outcome = classify_extraction(Err(ExtractionError::Unavailable(
            "connection refused".to_string(),
        )));
        match outcome {
            ExtractionOutcome::Failed { error } => {
                assert!(error.contains("connection refused"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fixed_extractor_round_trip() {
        let extractor = FixedExtractor::succeeding(full_fields());
        let extracted = extractor.extract("anything").await.unwrap();
        assert_eq!(extracted, full_fields());

        let failing = FixedExtractor::failing(ExtractionError::NotConfigured);
        assert!(failing.extract("anything").await.is_err());
    }
}
