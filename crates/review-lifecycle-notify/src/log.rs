use crate::dispatcher::NotificationDispatcher;
use crate::error::DispatchError;
use crate::notification::Notification;
use async_trait::async_trait;
use tracing::info;

/// Dispatcher that only logs. Used when notifications are disabled or no
/// transport is configured, so the engine's dispatch paths stay exercised.
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
        info!(
            operation = "notification_logged",
            kind = notification.kind.as_str(),
            to = %notification.to_email,
            subject = %notification.subject,
            "Notification suppressed (log-only dispatcher)"
        );
        Ok(())
    }
}
