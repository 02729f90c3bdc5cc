//! Email delivery service for outbound notifications.
//!
//! Supports multiple providers:
//! - `console`: Logs emails to console (development)
//! - `smtp`: Sends via SMTP server
//!
//! Delivery is best-effort: a failed send is reported to the caller for
//! logging but never affects registration state. The send-once gate lives
//! with the draft repository's `response_sent` check-and-set, not here.

use crate::config::EmailConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            provider => {
                warn!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Console provider - logs email to console (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );

        info!(
            body_text = %message.body_text,
            "Email body (plain text)"
        );

        Ok(())
    }

    /// SMTP provider - sends via SMTP server.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        // Full SMTP support needs the lettre crate; until then the message
        // is logged so a misconfigured deployment is visible in one place.
        warn!(
            provider = "smtp",
            host = %self.config.smtp_host,
            port = %self.config.smtp_port,
            "SMTP provider configured but full implementation requires lettre crate"
        );

        info!(
            to = %message.to,
            subject = %message.subject,
            smtp_host = %self.config.smtp_host,
            "Email would be sent via SMTP (full implementation pending)"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(provider: &str, enabled: bool) -> EmailConfig {
        EmailConfig {
            enabled,
            provider: provider.to_string(),
            sender_email: "noreply@eventdesk.test".to_string(),
            sender_name: "Eventdesk".to_string(),
            ..Default::default()
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "guest@example.com".to_string(),
            subject: "Please confirm your event request".to_string(),
            body_text: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disabled_service_skips_send() {
        let service = EmailService::new(test_config("console", false));
        assert!(!service.is_enabled());
        assert!(service.send(message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_provider_sends() {
        let service = EmailService::new(test_config("console", true));
        assert!(service.send(message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_errors() {
        let service = EmailService::new(test_config("pigeon", true));
        assert!(matches!(
            service.send(message()).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_smtp_without_host_errors() {
        let service = EmailService::new(test_config("smtp", true));
        assert!(matches!(
            service.send(message()).await,
            Err(EmailError::NotConfigured)
        ));
    }
}
