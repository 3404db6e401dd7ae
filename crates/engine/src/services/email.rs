//! Email transport.
//!
//! Providers:
//! - `console`: logs the message instead of sending (development)
//! - `sendgrid`: SendGrid v3 API over HTTPS

use tracing::{debug, error, info};

use crate::config::EmailConfig;

/// Concrete email transport backed by the configured provider.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn send_console(&self, to: &str, subject: &str, html: &str) -> bool {
        info!(
            to = %to,
            subject = %subject,
            from = %self.config.sender_email,
            body_length = html.len(),
            "Email (console provider)"
        );
        true
    }

    async fn send_sendgrid(&self, to: &str, subject: &str, html: &str) -> bool {
        if self.config.sendgrid_api_key.is_empty() {
            error!("SendGrid provider selected but no API key configured");
            return false;
        }

        let body = serde_json::json!({
            "personalizations": [{
                "to": [{ "email": to }]
            }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": subject,
            "content": [{
                "type": "text/html",
                "value": html
            }]
        });

        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!(to = %to, "Email sent via SendGrid");
                true
            }
            Ok(resp) => {
                error!(to = %to, status = %resp.status(), "SendGrid rejected the email");
                false
            }
            Err(e) => {
                error!(to = %to, "SendGrid request failed: {}", e);
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl domain::services::EmailTransport for EmailService {
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool {
        if !self.config.enabled {
            debug!(to = %to, subject = %subject, "Email disabled, skipping send");
            return false;
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(to, subject, html).await,
            "sendgrid" => self.send_sendgrid(to, subject, html).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::EmailTransport;

    #[tokio::test]
    async fn test_disabled_service_does_not_send() {
        let service = EmailService::new(EmailConfig::default());
        assert!(!service.send("a@b.c", "Subject", "<p>Hi</p>").await);
    }

    #[tokio::test]
    async fn test_console_provider_reports_success() {
        let config = EmailConfig {
            enabled: true,
            provider: "console".into(),
            ..EmailConfig::default()
        };
        let service = EmailService::new(config);
        assert!(service.send("a@b.c", "Subject", "<p>Hi</p>").await);
    }

    #[tokio::test]
    async fn test_unknown_provider_fails() {
        let config = EmailConfig {
            enabled: true,
            provider: "pigeon".into(),
            ..EmailConfig::default()
        };
        let service = EmailService::new(config);
        assert!(!service.send("a@b.c", "Subject", "body").await);
    }
}
