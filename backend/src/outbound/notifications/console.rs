//! Dispatcher that writes rendered notifications to the log.

use async_trait::async_trait;
use tracing::info;

use crate::domain::Notification;
use crate::domain::ports::{NotificationDispatcher, NotificationError};

use super::templates::render;

/// Logs each message instead of sending it. Used when no SMTP relay is
/// configured, e.g. in local development.
#[derive(Debug, Clone)]
pub struct ConsoleNotificationDispatcher {
    frontend_url: String,
}

impl ConsoleNotificationDispatcher {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for ConsoleNotificationDispatcher {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        let email = render(&notification, &self.frontend_url);
        info!(
            to = %notification.recipient.email,
            kind = notification.kind.label(),
            subject = %email.subject,
            "email (console transport)"
        );
        Ok(())
    }
}
