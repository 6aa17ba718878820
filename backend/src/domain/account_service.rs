//! Account service: registration, email verification, login, password
//! reset and profile edits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AccountCommand, AccountQuery, ChangeRoleRequest, ForgotPasswordRequest, LoginRequest,
    NewUserRecord, NotificationDispatcher, PasswordHasher, RegisterRequest,
    ResendVerificationRequest, ResetPasswordRequest, UpdateProfileRequest, UserPayload,
    UserRepository, VerifyEmailRequest,
};
use crate::domain::service_support::{map_user_error, notify, require_verified_user};
use crate::domain::{
    Error, Notification, NotificationKind, PasswordResetGrant, ResetCode, User, UserDraft, UserId,
    UserProfile, UserUpdate, VerificationToken,
};

/// Minutes a mailed reset code stays valid.
pub const RESET_CODE_TTL_MINUTES: i64 = 10;

fn merge_profile(current: &UserProfile, patch: UserProfile) -> UserProfile {
    UserProfile {
        phone: patch.phone.or_else(|| current.phone.clone()),
        address: patch.address.or_else(|| current.address.clone()),
        date_of_birth: patch.date_of_birth.or_else(|| current.date_of_birth.clone()),
        bio: patch.bio.or_else(|| current.bio.clone()),
        profile_image: patch.profile_image.or_else(|| current.profile_image.clone()),
    }
}

/// Account service implementing the account command and query ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl<U> AccountService<U> {
    /// Create an account service over the identity store.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            notifier,
            clock,
        }
    }
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    async fn apply_update(&self, id: &UserId, update: &UserUpdate) -> Result<User, Error> {
        self.users
            .update(id, update)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn send_verification(&self, user: &User, token: VerificationToken) {
        notify(
            self.notifier.as_ref(),
            Notification::new(user, NotificationKind::Verification { token }),
        )
        .await;
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<UserPayload, Error> {
        let RegisterRequest {
            email,
            password,
            name,
            role,
            phone,
        } = request;

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(Error::invalid_request("email already registered"));
        }

        let password_hash = self
            .hasher
            .hash(&password)
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User::new(UserDraft {
            id: UserId::random(),
            email,
            name,
            role,
            profile: UserProfile {
                phone: phone.filter(|phone| !phone.trim().is_empty()),
                ..UserProfile::default()
            },
            verified: false,
            created_at: self.clock.utc(),
        });
        let token = VerificationToken::generate();
        self.users
            .create(&NewUserRecord {
                user: user.clone(),
                password_hash,
                verification_token: token.clone(),
            })
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), role = %user.role(), "account registered");

        self.send_verification(&user, token).await;
        Ok(UserPayload::from(user))
    }

    async fn verify_email(&self, request: VerifyEmailRequest) -> Result<UserPayload, Error> {
        let pending = self
            .users
            .find_by_verification_token(&request.token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::invalid_request("Invalid or expired verification token"))?;
        let user = self
            .users
            .mark_verified(&pending.id())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        info!(user_id = %user.id(), "email verified");

        notify(
            self.notifier.as_ref(),
            Notification::new(&user, NotificationKind::Welcome { role: user.role() }),
        )
        .await;
        Ok(UserPayload::from(user))
    }

    async fn resend_verification(&self, request: ResendVerificationRequest) -> Result<(), Error> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        if user.is_verified() {
            return Err(Error::invalid_request("Email is already verified"));
        }

        let token = VerificationToken::generate();
        self.users
            .replace_verification_token(&user.id(), &token)
            .await
            .map_err(map_user_error)?;
        self.send_verification(&user, token).await;
        Ok(())
    }

    async fn login(&self, request: LoginRequest) -> Result<UserPayload, Error> {
        let (user, hash) = self
            .users
            .find_credentials(&request.email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("Invalid email or password"))?;
        let matches = self
            .hasher
            .verify(&request.password, &hash)
            .map_err(|err| Error::internal(err.to_string()))?;
        if !matches {
            return Err(Error::unauthorized("Invalid email or password"));
        }
        if !user.is_verified() {
            return Err(Error::forbidden(
                "Please verify your email address before logging in",
            ));
        }
        Ok(UserPayload::from(user))
    }

    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), Error> {
        let Some(user) = self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(map_user_error)?
        else {
            info!("password reset requested for an unknown address");
            return Ok(());
        };

        let grant = PasswordResetGrant {
            code: ResetCode::generate(),
            expires_at: self.clock.utc() + Duration::minutes(RESET_CODE_TTL_MINUTES),
        };
        self.users
            .store_reset_grant(&user.id(), &grant)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), "password reset code issued");

        notify(
            self.notifier.as_ref(),
            Notification::new(
                &user,
                NotificationKind::PasswordReset {
                    code: grant.code,
                    valid_for_minutes: RESET_CODE_TTL_MINUTES,
                },
            ),
        )
        .await;
        Ok(())
    }

    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), Error> {
        let ResetPasswordRequest {
            email,
            code,
            new_password,
        } = request;
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::invalid_request("Invalid email or OTP"))?;
        let grant = self
            .users
            .find_reset_grant(&user.id())
            .await
            .map_err(map_user_error)?
            .filter(|grant| !grant.is_expired(self.clock.utc()))
            .ok_or_else(|| Error::invalid_request("OTP has expired or is invalid"))?;
        if grant.code != code {
            return Err(Error::invalid_request("Invalid OTP"));
        }

        let password_hash = self
            .hasher
            .hash(&new_password)
            .map_err(|err| Error::internal(err.to_string()))?;
        self.users
            .replace_password(&user.id(), &password_hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), "password reset");
        Ok(())
    }

    async fn change_role(&self, request: ChangeRoleRequest) -> Result<UserPayload, Error> {
        let user = require_verified_user(self.users.as_ref(), request.actor).await?;
        let updated = self
            .apply_update(
                &user.id(),
                &UserUpdate {
                    role: Some(request.role),
                    ..UserUpdate::default()
                },
            )
            .await?;
        info!(user_id = %updated.id(), role = %updated.role(), "role changed");
        Ok(UserPayload::from(updated))
    }

    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<UserPayload, Error> {
        let user = require_verified_user(self.users.as_ref(), request.actor).await?;
        let update = UserUpdate {
            name: request.name,
            profile: Some(merge_profile(user.profile(), request.profile)),
            ..UserUpdate::default()
        };
        let updated = self.apply_update(&user.id(), &update).await?;
        Ok(UserPayload::from(updated))
    }
}

#[async_trait]
impl<U> AccountQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn current_user(&self, actor: UserId) -> Result<UserPayload, Error> {
        let user = require_verified_user(self.users.as_ref(), actor).await?;
        Ok(UserPayload::from(user))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
