//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live with
//! the repository that reads them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{bookings, cars, reviews, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub is_verified: bool,
    #[expect(dead_code, reason = "tokens are matched in SQL, never read back")]
    pub verification_token: Option<String>,
    pub password_reset_code: Option<String>,
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "audit column maintained by updates")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub date_of_birth: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub profile_image: Option<&'a str>,
    pub is_verified: bool,
    pub verification_token: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial account update. `None` leaves a column untouched; the inner
/// `Option` of profile columns writes `NULL`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub phone: Option<Option<&'a str>>,
    pub address: Option<Option<&'a str>>,
    pub date_of_birth: Option<Option<&'a str>>,
    pub bio: Option<Option<&'a str>>,
    pub profile_image: Option<Option<&'a str>>,
    pub is_verified: Option<bool>,
}

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

/// Row struct for reading from the cars table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarRow {
    pub id: Uuid,
    pub host_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub price_per_day: f64,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub features: Vec<String>,
    pub is_available: bool,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insertable struct for new listings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cars)]
pub(crate) struct NewCarRow<'a> {
    pub id: Uuid,
    pub host_id: Uuid,
    pub make: &'a str,
    pub model: &'a str,
    pub year: i32,
    pub color: &'a str,
    pub price_per_day: f64,
    pub description: &'a str,
    pub image_url: Option<&'a str>,
    pub location: &'a str,
    pub features: &'a [String],
    pub is_available: bool,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
}

/// Host-editable columns. A cleared image writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cars)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CarDetailsChangeset<'a> {
    pub make: &'a str,
    pub model: &'a str,
    pub year: i32,
    pub color: &'a str,
    pub price_per_day: f64,
    pub description: &'a str,
    pub image_url: Option<&'a str>,
    pub location: &'a str,
    pub features: &'a [String],
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

/// Row struct for reading from the bookings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub host_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub driver_license: String,
    pub additional_notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new bookings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub host_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub driver_license: &'a str,
    pub additional_notes: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub booking_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new reviews.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub booking_id: Uuid,
    pub rating: i16,
    pub comment: &'a str,
    pub created_at: DateTime<Utc>,
}
