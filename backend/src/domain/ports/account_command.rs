//! Driving port for account registration, verification and profile edits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    EmailAddress, Error, Password, PersonName, ResetCode, Role, User, UserId, UserProfile,
    VerificationToken,
};

/// Serializable user payload. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_verified: bool,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPayload {
    fn from(value: User) -> Self {
        Self {
            id: value.id(),
            email: value.email().to_string(),
            name: value.name().to_string(),
            role: value.role(),
            is_verified: value.is_verified(),
            profile: value.profile().clone(),
            created_at: value.created_at(),
        }
    }
}

/// Request to open an account.
#[derive(Debug)]
pub struct RegisterRequest {
    pub email: EmailAddress,
    pub password: Password,
    pub name: PersonName,
    pub role: Role,
    pub phone: Option<String>,
}

/// Request to confirm an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyEmailRequest {
    pub token: VerificationToken,
}

/// Request to mail a fresh verification token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendVerificationRequest {
    pub email: EmailAddress,
}

/// Request to authenticate with email and password.
#[derive(Debug)]
pub struct LoginRequest {
    pub email: EmailAddress,
    pub password: Password,
}

/// Request to mail a password reset code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgotPasswordRequest {
    pub email: EmailAddress,
}

/// Request to set a new password with a mailed reset code.
#[derive(Debug)]
pub struct ResetPasswordRequest {
    pub email: EmailAddress,
    pub code: ResetCode,
    pub new_password: Password,
}

/// Request to switch between renter and host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRoleRequest {
    pub actor: UserId,
    pub role: Role,
}

/// Request to edit the caller's name and profile fields.
///
/// Profile fields left as `None` keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProfileRequest {
    pub actor: UserId,
    pub name: Option<PersonName>,
    pub profile: UserProfile,
}

/// Driving port for account write operations.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an unverified account and mail a verification link.
    async fn register(&self, request: RegisterRequest) -> Result<UserPayload, Error>;

    /// Confirm the address behind a token.
    async fn verify_email(&self, request: VerifyEmailRequest) -> Result<UserPayload, Error>;

    /// Issue and mail a new verification token.
    async fn resend_verification(&self, request: ResendVerificationRequest) -> Result<(), Error>;

    /// Check credentials for a verified account.
    async fn login(&self, request: LoginRequest) -> Result<UserPayload, Error>;

    /// Mail a reset code when the address belongs to an account.
    ///
    /// Succeeds either way so callers cannot enumerate registered addresses.
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), Error>;

    /// Replace the password after checking the reset code and its expiry.
    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), Error>;

    /// Switch the caller's role.
    async fn change_role(&self, request: ChangeRoleRequest) -> Result<UserPayload, Error>;

    /// Edit the caller's profile.
    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<UserPayload, Error>;
}
