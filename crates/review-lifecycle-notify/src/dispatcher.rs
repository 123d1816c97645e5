use crate::error::DispatchError;
use crate::notification::Notification;
use async_trait::async_trait;

/// Notification transport seam. The engine treats delivery as best-effort:
/// a failed send is logged by the caller and never rolls back a committed
/// status transition.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), DispatchError>;
}
