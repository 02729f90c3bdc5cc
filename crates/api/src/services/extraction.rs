//! HTTP client for the external event extraction capability.
//!
//! The capability is opaque: it takes the plain-text email body and returns
//! a structured proposal or an error, with unspecified latency. This client
//! implements the domain [`Extractor`] seam over a JSON POST so the rest of
//! the pipeline never sees transport details.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use domain::services::extraction::{ExtractedEvent, ExtractionError, Extractor};

use crate::config::ExtractionConfig;

/// Request payload sent to the extraction service.
#[derive(Debug, Serialize)]
struct ExtractionRequest<'a> {
    text: &'a str,
}

/// Response payload from the extraction service.
///
/// The service reports either fields or an error, never both.
#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    event: Option<ExtractedEvent>,
    #[serde(default)]
    error: Option<String>,
}

/// Extraction client over HTTP.
#[derive(Clone)]
pub struct HttpExtractor {
    config: ExtractionConfig,
    client: Client,
}

impl HttpExtractor {
    /// Creates a new extractor client from configuration.
    pub fn new(config: ExtractionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractedEvent, ExtractionError> {
        if !self.config.enabled {
            return Err(ExtractionError::NotConfigured);
        }
        if self.config.url.is_empty() {
            return Err(ExtractionError::NotConfigured);
        }

        debug!(url = %self.config.url, text_len = text.len(), "Requesting extraction");

        let response = self
            .client
            .post(&self.config.url)
            .json(&ExtractionRequest { text })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Extraction request failed");
                ExtractionError::Unavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Extraction service returned an error");
            return Err(ExtractionError::Failed(format!(
                "Extraction service returned {}: {}",
                status, body
            )));
        }

        let parsed: ExtractionResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Failed(format!("Invalid extraction response: {}", e)))?;

        match (parsed.event, parsed.error) {
            (_, Some(error)) => Err(ExtractionError::Failed(error)),
            (Some(event), None) => Ok(event),
            (None, None) => Err(ExtractionError::Failed(
                "Extraction service returned an empty response".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_extractor_reports_not_configured() {
        let extractor = HttpExtractor::new(ExtractionConfig {
            enabled: false,
            url: "http://localhost:9".to_string(),
            timeout_ms: 100,
        });
        assert!(matches!(
            extractor.extract("anything").await,
            Err(ExtractionError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_enabled_without_url_reports_not_configured() {
        let extractor = HttpExtractor::new(ExtractionConfig {
            enabled: true,
            url: String::new(),
            timeout_ms: 100,
        });
        assert!(matches!(
            extractor.extract("anything").await,
            Err(ExtractionError::NotConfigured)
        ));
    }

    #[test]
    fn test_response_shape_parses_event() {
        let json = r#"{"event":{"title":"Robotics workshop","start":"2025-03-01T14:00:00Z"}}"#;
        let parsed: ExtractionResponse = serde_json::from_str(json).unwrap();
        let event = parsed.event.unwrap();
        assert_eq!(event.title.as_deref(), Some("Robotics workshop"));
        assert!(event.end.is_none());
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_response_shape_parses_error() {
        let json = r#"{"error":"model overloaded"}"#;
        let parsed: ExtractionResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.event.is_none());
        assert_eq!(parsed.error.as_deref(), Some("model overloaded"));
    }
}
