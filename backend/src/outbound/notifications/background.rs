//! Fire-and-forget wrapper around another dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{NotificationDispatcher, NotificationError};
use crate::domain::{Notification, TraceId};

/// Spawns every dispatch onto the Tokio runtime and returns immediately.
///
/// The spawned task runs inside the caller's [`TraceId`] scope. Failures are
/// logged and dropped; nothing is retried.
#[derive(Clone)]
pub struct BackgroundNotificationDispatcher {
    inner: Arc<dyn NotificationDispatcher>,
}

impl BackgroundNotificationDispatcher {
    pub fn new(inner: Arc<dyn NotificationDispatcher>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl NotificationDispatcher for BackgroundNotificationDispatcher {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(TraceId::propagate(async move {
            let kind = notification.kind.label();
            if let Err(error) = inner.dispatch(notification).await {
                warn!(
                    kind,
                    trace_id = ?TraceId::current().map(|id| id.to_string()),
                    %error,
                    "background notification failed"
                );
            }
        }));
        Ok(())
    }
}
