//! Driving port for reading the signed-in account.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

use super::UserPayload;

/// Driving port for account read operations.
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// The verified account behind a session.
    async fn current_user(&self, actor: UserId) -> Result<UserPayload, Error>;
}
