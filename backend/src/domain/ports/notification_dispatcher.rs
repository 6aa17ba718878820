//! Port for delivering notifications to users.
//!
//! Delivery is best effort. Callers log failures and carry on; a failed
//! email never rolls back the operation that triggered it.
use async_trait::async_trait;

use crate::domain::Notification;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationError {
        /// The message could not be built, e.g. an unparsable address.
        Compose { message: String } => "notification could not be composed: {message}",
        /// The transport refused or failed to deliver the message.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver one notification.
    async fn dispatch(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Dispatcher that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for NoOpNotificationDispatcher {
    async fn dispatch(&self, _notification: Notification) -> Result<(), NotificationError> {
        Ok(())
    }
}
