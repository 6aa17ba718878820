//! Port abstraction for the identity store.
use async_trait::async_trait;

use crate::domain::{
    EmailAddress, PasswordHash, PasswordResetGrant, User, UserId, UserUpdate, VerificationToken,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the address.
        DuplicateEmail { email: String } => "a user with email {email} already exists",
    }
}

/// Everything stored when an account is registered.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub user: User,
    pub password_hash: PasswordHash,
    pub verification_token: VerificationToken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, rejecting duplicate addresses.
    async fn create(&self, record: &NewUserRecord) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user together with their stored password hash.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError>;

    /// Fetch the user holding an outstanding verification token.
    async fn find_by_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Replace the outstanding verification token.
    async fn replace_verification_token(
        &self,
        id: &UserId,
        token: &VerificationToken,
    ) -> Result<(), UserPersistenceError>;

    /// Mark the address confirmed and discard the token.
    async fn mark_verified(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Apply a partial update and return the stored result.
    async fn update(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Store a reset code, replacing any earlier one.
    async fn store_reset_grant(
        &self,
        id: &UserId,
        grant: &PasswordResetGrant,
    ) -> Result<(), UserPersistenceError>;

    /// Outstanding reset code for the user, if any.
    async fn find_reset_grant(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordResetGrant>, UserPersistenceError>;

    /// Store a new password hash and discard the reset code.
    async fn replace_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;
}
