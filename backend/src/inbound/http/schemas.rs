//! OpenAPI schema definitions for domain and port payloads.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The wrappers mirror the serialised shape (camelCase) of the payloads the
//! handlers return. Flattened payloads repeat the inner fields.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The car is missing or not open for booking.
    #[schema(rename = "car_unavailable")]
    CarUnavailable,
    /// Overlapping booking or duplicate review.
    #[schema(rename = "conflict")]
    Conflict,
    /// The booking cannot be reviewed yet.
    #[schema(rename = "not_eligible")]
    NotEligible,
    /// Bookings in flight block the change.
    #[schema(rename = "active_booking_exists")]
    ActiveBookingExists,
    /// A backing store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Car is already booked for the selected dates")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "7d0f7b3e-2c4e-4f0e-9a43-8f1c6c1d2a55")]
    trace_id: Option<String>,
    /// Supplementary error details for clients, such as the offending
    /// field or the clashing booking ids.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ports::UserPayload`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::UserPayload, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "rita@example.com")]
    email: String,
    #[schema(example = "Rita Renter")]
    name: String,
    /// `user` (renter) or `host`.
    #[schema(example = "user")]
    role: String,
    is_verified: bool,
    phone: Option<String>,
    address: Option<String>,
    date_of_birth: Option<String>,
    bio: Option<String>,
    profile_image: Option<String>,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::CarPayload`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::CarPayload, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CarSchema {
    id: String,
    host_id: String,
    #[schema(example = "Toyota")]
    make: String,
    #[schema(example = "Corolla")]
    model: String,
    #[schema(example = 2021)]
    year: i32,
    color: String,
    #[schema(example = 45.0)]
    price_per_day: f64,
    description: String,
    image_url: Option<String>,
    #[schema(example = "Lisbon")]
    location: String,
    features: Vec<String>,
    is_available: bool,
    /// Mean rating rounded to one decimal place; 0 without reviews.
    #[schema(example = 4.5)]
    average_rating: f64,
    total_reviews: u32,
    created_at: String,
    updated_at: Option<String>,
    /// Set when the car was withdrawn because of its booking history.
    deleted_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ports::ReviewPayload`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ReviewPayload, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ReviewSchema {
    id: String,
    user_id: String,
    /// Reviewer's name, or `Anonymous` when the account is gone.
    #[schema(example = "Rita Renter")]
    user_name: String,
    car_id: String,
    booking_id: String,
    #[schema(minimum = 1, maximum = 5, example = 5)]
    rating: u8,
    comment: String,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::CarDetailsResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::CarDetailsResponse, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CarDetailsSchema {
    id: String,
    host_id: String,
    #[schema(example = "Toyota")]
    make: String,
    #[schema(example = "Corolla")]
    model: String,
    #[schema(example = 2021)]
    year: i32,
    color: String,
    #[schema(example = 45.0)]
    price_per_day: f64,
    description: String,
    image_url: Option<String>,
    #[schema(example = "Lisbon")]
    location: String,
    features: Vec<String>,
    is_available: bool,
    average_rating: f64,
    total_reviews: u32,
    created_at: String,
    updated_at: Option<String>,
    deleted_at: Option<String>,
    reviews: Vec<ReviewSchema>,
}

/// OpenAPI schema for [`crate::domain::CarSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CarSummary, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CarSummarySchema {
    id: String,
    make: String,
    model: String,
    year: i32,
    price_per_day: f64,
    location: String,
    image_url: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ports::BookingPayload`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::BookingPayload, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BookingSchema {
    id: String,
    user_id: String,
    car_id: String,
    host_id: String,
    #[schema(example = "2024-06-01T00:00:00Z")]
    start_date: String,
    #[schema(example = "2024-06-03T00:00:00Z")]
    end_date: String,
    #[schema(example = 135.0)]
    total_amount: f64,
    driver_license: String,
    additional_notes: Option<String>,
    /// `pending`, `confirmed`, `active`, `completed` or `cancelled`.
    #[schema(example = "pending")]
    status: String,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::ContactCard`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ContactCard)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ContactCardSchema {
    name: String,
    phone: Option<String>,
    /// Present only when a host views their renter.
    email: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ports::BookingListing`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::BookingListing, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BookingListingSchema {
    id: String,
    user_id: String,
    car_id: String,
    host_id: String,
    start_date: String,
    end_date: String,
    total_amount: f64,
    driver_license: String,
    additional_notes: Option<String>,
    status: String,
    created_at: String,
    car: Option<CarSummarySchema>,
    /// Set for renters.
    host: Option<ContactCardSchema>,
    /// Set for hosts.
    user: Option<ContactCardSchema>,
}
