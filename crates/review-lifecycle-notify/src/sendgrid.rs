use crate::dispatcher::NotificationDispatcher;
use crate::error::DispatchError;
use crate::notification::Notification;
use async_trait::async_trait;
use reqwest::Client;
use review_lifecycle_config::NotificationsConfig;
use tracing::{debug, info};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// SendGrid-backed transport, matching the platform's production mail setup.
pub struct SendGridDispatcher {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
    send_url: String,
}

impl SendGridDispatcher {
    pub fn new(api_key: String, from_email: String, from_name: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            from_email,
            from_name,
            send_url: SENDGRID_SEND_URL.to_string(),
        }
    }

    pub fn from_config(config: &NotificationsConfig) -> Result<Self, DispatchError> {
        let sendgrid = config.sendgrid.as_ref().ok_or_else(|| {
            DispatchError::NotConfigured("notifications.sendgrid.api_key is not set".to_string())
        })?;
        Ok(Self::new(
            sendgrid.api_key.clone(),
            config.from_email.clone(),
            config.from_name.clone(),
        ))
    }

    /// Override the API endpoint; test hook.
    pub fn with_send_url(mut self, url: impl Into<String>) -> Self {
        self.send_url = url.into();
        self
    }

    pub(crate) fn build_payload(&self, notification: &Notification) -> serde_json::Value {
        serde_json::json!({
            "personalizations": [{
                "to": [{
                    "email": notification.to_email,
                    "name": notification.to_name,
                }],
            }],
            "from": {
                "email": self.from_email,
                "name": self.from_name,
            },
            "subject": notification.subject,
            "content": [{
                "type": "text/plain",
                "value": notification.body,
            }],
            "custom_args": {
                "kind": notification.kind.as_str(),
            },
        })
    }
}

#[async_trait]
impl NotificationDispatcher for SendGridDispatcher {
    async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        debug!(
            operation = "notification_send",
            kind = notification.kind.as_str(),
            to = %notification.to_email,
            "Sending notification via SendGrid"
        );

        let payload = self.build_payload(notification);
        let response = self
            .client
            .post(&self.send_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            operation = "notification_sent",
            kind = notification.kind.as_str(),
            to = %notification.to_email,
            status = status.as_u16(),
            "Notification accepted by SendGrid"
        );
        Ok(())
    }
}
