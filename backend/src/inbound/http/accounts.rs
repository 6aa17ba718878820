//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"rita@example.com","password":"...","name":"Rita","role":"user"}
//! POST /api/v1/auth/verify-email {"token":"..."}
//! POST /api/v1/auth/resend-verification {"email":"rita@example.com"}
//! POST /api/v1/auth/login {"email":"rita@example.com","password":"..."}
//! POST /api/v1/auth/forgot-password {"email":"rita@example.com"}
//! POST /api/v1/auth/reset-password {"email":"rita@example.com","otp":"042917","newPassword":"..."}
//! GET  /api/v1/auth/me
//! PUT  /api/v1/auth/change-role {"newRole":"host"}
//! PUT  /api/v1/profile {"phone":"+351 900 000 000"}
//! ```

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    ChangeRoleRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResendVerificationRequest, ResetPasswordRequest, UpdateProfileRequest, UserPayload,
    VerifyEmailRequest,
};
use crate::domain::{
    EmailAddress, Password, PersonName, ResetCode, Role, UserProfile, VerificationToken,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::MessageResponse;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, user_validation_error};

/// Registration body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub name: String,
    /// `user` (renter) or `host`. Defaults to `user`.
    #[schema(example = "user")]
    pub role: Option<String>,
    pub phone: Option<String>,
}

/// Acknowledgement returned after registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationAccepted {
    pub message: String,
    pub email: String,
}

/// Body for `POST /api/v1/auth/verify-email`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailBody {
    pub token: String,
}

/// Body for `POST /api/v1/auth/resend-verification`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResendVerificationBody {
    pub email: Option<String>,
}

/// Body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Body for `POST /api/v1/auth/forgot-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordBody {
    pub email: String,
}

/// Body for `POST /api/v1/auth/reset-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    pub email: String,
    #[schema(example = "042917")]
    pub otp: String,
    pub new_password: String,
}

/// Body for `PUT /api/v1/auth/change-role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleBody {
    #[schema(example = "host")]
    pub new_role: String,
}

/// Body for `PUT /api/v1/profile`. Omitted fields keep their value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

/// A message plus the account it concerns.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub message: String,
    #[schema(value_type = UserSchema)]
    pub user: UserPayload,
}

fn parse_role(raw: Option<String>) -> ApiResult<Role> {
    raw.map_or(Ok(Role::Renter), |value| {
        value.parse().map_err(user_validation_error)
    })
}

/// Open an unverified account and mail a verification link.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 200, description = "Account created; verification pending", body = RegistrationAccepted),
        (status = 400, description = "Invalid request or email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<web::Json<RegistrationAccepted>> {
    let RegisterBody {
        email,
        password,
        name,
        role,
        phone,
    } = payload.into_inner();
    let request = RegisterRequest {
        email: EmailAddress::new(email).map_err(user_validation_error)?,
        password: Password::new(password).map_err(user_validation_error)?,
        name: PersonName::new(name).map_err(user_validation_error)?,
        role: parse_role(role)?,
        phone: phone.filter(|value| !value.trim().is_empty()),
    };

    let user = state.accounts.register(request).await?;
    Ok(web::Json(RegistrationAccepted {
        message: "Registration successful! Please check your email to verify your account."
            .to_owned(),
        email: user.email,
    }))
}

/// Confirm an email address and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-email",
    request_body = VerifyEmailBody,
    responses(
        (status = 200, description = "Email verified; session cookie issued", body = AccountResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid or expired token", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "verifyEmail",
    security([])
)]
#[post("/auth/verify-email")]
pub async fn verify_email(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyEmailBody>,
) -> ApiResult<web::Json<AccountResponse>> {
    let token = payload.into_inner().token;
    if token.trim().is_empty() {
        return Err(missing_field_error(FieldName::new("token")));
    }

    let user = state
        .accounts
        .verify_email(VerifyEmailRequest {
            token: VerificationToken::from_raw(token.trim()),
        })
        .await?;
    session.persist_user(user.id)?;
    Ok(web::Json(AccountResponse {
        message: "Email verified successfully! Welcome to CarShare!".to_owned(),
        user,
    }))
}

/// Mail a fresh verification link to an unverified account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-verification",
    request_body = ResendVerificationBody,
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 400, description = "Missing email or already verified", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "resendVerification",
    security([])
)]
#[post("/auth/resend-verification")]
pub async fn resend_verification(
    state: web::Data<HttpState>,
    payload: web::Json<ResendVerificationBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = payload
        .into_inner()
        .email
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| missing_field_error(FieldName::new("email")))?;
    let email = EmailAddress::new(email).map_err(user_validation_error)?;

    state
        .accounts
        .resend_verification(ResendVerificationRequest { email })
        .await?;
    Ok(web::Json(MessageResponse::new(
        "Verification email sent! Please check your inbox.",
    )))
}

/// Authenticate with email and password and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = AccountResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Incorrect email or password", body = ErrorSchema),
        (status = 403, description = "Email not verified", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<AccountResponse>> {
    let LoginBody { email, password } = payload.into_inner();
    let request = LoginRequest {
        email: EmailAddress::new(email).map_err(user_validation_error)?,
        password: Password::unchecked(password),
    };

    let user = state.accounts.login(request).await?;
    session.persist_user(user.id)?;
    Ok(web::Json(AccountResponse {
        message: "Login successful".to_owned(),
        user,
    }))
}

/// Mail a password reset code. The reply never reveals whether the
/// address is registered.
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    request_body = ForgotPasswordBody,
    responses(
        (status = 200, description = "Reset code mailed if the account exists", body = MessageResponse),
        (status = 400, description = "Invalid email", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/auth/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = EmailAddress::new(payload.into_inner().email).map_err(user_validation_error)?;

    state
        .accounts
        .forgot_password(ForgotPasswordRequest { email })
        .await?;
    Ok(web::Json(MessageResponse::new(
        "If the email exists, you will receive a password reset OTP.",
    )))
}

/// Set a new password using a mailed reset code.
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Unknown email, wrong or expired code, or weak password",
            body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/auth/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let ResetPasswordBody {
        email,
        otp,
        new_password,
    } = payload.into_inner();
    let request = ResetPasswordRequest {
        email: EmailAddress::new(email).map_err(user_validation_error)?,
        code: ResetCode::new(otp).map_err(user_validation_error)?,
        new_password: Password::new(new_password).map_err(user_validation_error)?,
    };

    state.accounts.reset_password(request).await?;
    Ok(web::Json(MessageResponse::new("Password reset successfully")))
}

/// The signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Email not verified", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserPayload>> {
    let actor = session.require_user_id()?;
    let user = state.accounts_query.current_user(actor).await?;
    Ok(web::Json(user))
}

/// Switch the caller between renter and host.
#[utoipa::path(
    put,
    path = "/api/v1/auth/change-role",
    request_body = ChangeRoleBody,
    responses(
        (status = 200, description = "Role changed", body = AccountResponse),
        (status = 400, description = "Unknown role", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "changeRole"
)]
#[put("/auth/change-role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangeRoleBody>,
) -> ApiResult<web::Json<AccountResponse>> {
    let actor = session.require_user_id()?;
    let role = parse_role(Some(payload.into_inner().new_role))?;

    let user = state
        .accounts
        .change_role(ChangeRoleRequest { actor, role })
        .await?;
    Ok(web::Json(AccountResponse {
        message: format!("Role changed to {role} successfully"),
        user,
    }))
}

/// Edit the caller's name and contact details.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileBody,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileBody>,
) -> ApiResult<web::Json<UserPayload>> {
    let actor = session.require_user_id()?;
    let UpdateProfileBody {
        name,
        phone,
        address,
        date_of_birth,
        bio,
        profile_image,
    } = payload.into_inner();
    let name = name
        .map(PersonName::new)
        .transpose()
        .map_err(user_validation_error)?;

    let user = state
        .accounts
        .update_profile(UpdateProfileRequest {
            actor,
            name,
            profile: UserProfile {
                phone,
                address,
                date_of_birth,
                bio,
                profile_image,
            },
        })
        .await?;
    Ok(web::Json(user))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
