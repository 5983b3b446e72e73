//! SendGrid v3 mail-send client.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::info;

use crate::config::SendGridConfig;
use crate::error::NotifyError;
use crate::notify::{Notification, Notifier};

const PROVIDER: &str = "sendgrid";

pub struct SendGridNotifier {
    config: SendGridConfig,
    client: reqwest::Client,
}

impl SendGridNotifier {
    pub fn new(config: SendGridConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn send_url(&self) -> String {
        format!("{}/v3/mail/send", self.config.api_base)
    }
}

/// Request body for `POST /v3/mail/send`.
pub fn mail_payload(notification: &Notification) -> Value {
    json!({
        "personalizations": [{
            "to": [{ "email": notification.to }]
        }],
        "from": { "email": notification.from },
        "subject": notification.subject,
        "content": [{
            "type": "text/plain",
            "value": notification.body
        }]
    })
}

#[async_trait]
impl Notifier for SendGridNotifier {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.send_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&mail_payload(notification))
            .send()
            .await
            .map_err(|e| NotifyError::Request {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body,
            });
        }

        info!(
            status = status.as_u16(),
            to = %notification.to,
            "Notification email accepted"
        );
        Ok(())
    }
}
