//! Outgoing mail transport.
//!
//! Sends through the Mailjet v3.1 HTTP API when credentials are configured.
//! Without credentials the message is written to the log instead, which is
//! the development setup.

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::{MailSettings, MAILJET_SEND_URL};
use crate::errors::NotificationError;
use crate::jobs::EmailJob;

#[derive(Clone)]
pub struct Mailer {
    client: Client,
    settings: MailSettings,
}

impl Mailer {
    pub fn new(settings: MailSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    /// Deliver one message.
    ///
    /// Without Mailjet credentials the message is logged instead. Bodies can
    /// carry live reset links, so they only appear at `debug`.
    pub async fn send(&self, email: &EmailJob) -> Result<(), NotificationError> {
        let Some((api_key, api_secret)) = self.settings.mailjet_credentials() else {
            tracing::warn!(
                to = %email.to,
                subject = %email.subject,
                "Mailjet not configured, email not sent"
            );
            tracing::debug!(to = %email.to, body = %email.text, "Unsent email body");
            return Ok(());
        };

        let response = self
            .client
            .post(MAILJET_SEND_URL)
            .basic_auth(api_key, Some(api_secret))
            .json(&self.payload(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %email.to, subject = %email.subject, "Email delivered to Mailjet");
        Ok(())
    }

    fn payload(&self, email: &EmailJob) -> Value {
        let mut message = json!({
            "From": { "Email": self.settings.from_email, "Name": self.settings.from_name },
            "To": [{ "Email": email.to }],
            "Subject": email.subject,
            "TextPart": email.text,
        });
        if let Some(html) = &email.html {
            message["HTMLPart"] = Value::String(html.clone());
        }

        json!({ "Messages": [message] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailDelivery;

    fn settings() -> MailSettings {
        MailSettings {
            from_email: "support@coinblazers.com".to_string(),
            from_name: "CoinBlazers".to_string(),
            support_email: "support@coinblazers.com".to_string(),
            mailjet_api_key: None,
            mailjet_api_secret: None,
            delivery: EmailDelivery::Direct,
        }
    }

    #[test]
    fn test_payload_shape() {
        let mailer = Mailer::new(settings());
        let job = EmailJob::new("jane@example.com", "Hello", "Plain").with_html("<p>Hi</p>");

        let payload = mailer.payload(&job);
        let message = &payload["Messages"][0];
        assert_eq!(message["From"]["Email"], "support@coinblazers.com");
        assert_eq!(message["From"]["Name"], "CoinBlazers");
        assert_eq!(message["To"][0]["Email"], "jane@example.com");
        assert_eq!(message["TextPart"], "Plain");
        assert_eq!(message["HTMLPart"], "<p>Hi</p>");
    }

    #[test]
    fn test_payload_without_html() {
        let mailer = Mailer::new(settings());
        let job = EmailJob::new("jane@example.com", "Hello", "Plain");
        let payload = mailer.payload(&job);
        assert!(payload["Messages"][0].get("HTMLPart").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_transport_logs_and_succeeds() {
        let mailer = Mailer::new(settings());
        let job = EmailJob::new("jane@example.com", "Hello", "Plain");
        assert!(mailer.send(&job).await.is_ok());
    }
}
