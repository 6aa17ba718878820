//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health probes
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] that describe the wire format without
//!   coupling domain types to utoipa, and the request bodies
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is served by Swagger UI in debug builds.

use crate::inbound::http::accounts::{
    AccountResponse, ChangeRoleBody, ForgotPasswordBody, LoginBody, RegisterBody,
    RegistrationAccepted, ResendVerificationBody, ResetPasswordBody, UpdateProfileBody,
    VerifyEmailBody,
};
use crate::inbound::http::bookings::{CreateBookingBody, UpdateBookingStatusBody};
use crate::inbound::http::cars::{CarBody, CarRemovalResponse};
use crate::inbound::http::responses::MessageResponse;
use crate::inbound::http::reviews::CreateReviewBody;
use crate::inbound::http::schemas::{
    BookingListingSchema, BookingSchema, CarDetailsSchema, CarSchema, CarSummarySchema,
    ContactCardSchema, ErrorCodeSchema, ErrorSchema, ReviewSchema, UserSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login or /api/v1/auth/verify-email.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "CarShare backend API",
        description = "Peer-to-peer car rental marketplace: accounts, listings, bookings and reviews.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::verify_email,
        crate::inbound::http::accounts::resend_verification,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::forgot_password,
        crate::inbound::http::accounts::reset_password,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::accounts::change_role,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::cars::create_car,
        crate::inbound::http::cars::list_cars,
        crate::inbound::http::cars::get_car,
        crate::inbound::http::cars::list_my_cars,
        crate::inbound::http::cars::update_car,
        crate::inbound::http::cars::delete_car,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::update_booking_status,
        crate::inbound::http::bookings::booking_receipt,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::list_car_reviews,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        CarSchema,
        CarDetailsSchema,
        CarSummarySchema,
        ReviewSchema,
        BookingSchema,
        BookingListingSchema,
        ContactCardSchema,
        MessageResponse,
        RegisterBody,
        RegistrationAccepted,
        VerifyEmailBody,
        ResendVerificationBody,
        LoginBody,
        ForgotPasswordBody,
        ResetPasswordBody,
        ChangeRoleBody,
        UpdateProfileBody,
        AccountResponse,
        CarBody,
        CarRemovalResponse,
        CreateBookingBody,
        UpdateBookingStatusBody,
        CreateReviewBody,
    )),
    tags(
        (name = "accounts", description = "Registration, verification, login and profiles"),
        (name = "cars", description = "Car listings managed by hosts"),
        (name = "bookings", description = "Rentals and their status lifecycle"),
        (name = "reviews", description = "Ratings left after completed rentals"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
