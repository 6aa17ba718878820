//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command can regenerate them from a migrated
//! database.

diesel::table! {
    /// Registered accounts with credentials and profile fields.
    users (id) {
        id -> Uuid,
        /// Lower-cased address; unique.
        email -> Varchar,
        /// PHC-encoded password hash.
        password_hash -> Text,
        name -> Varchar,
        /// `user` (renter) or `host`.
        role -> Varchar,
        phone -> Nullable<Text>,
        address -> Nullable<Text>,
        date_of_birth -> Nullable<Text>,
        bio -> Nullable<Text>,
        profile_image -> Nullable<Text>,
        is_verified -> Bool,
        /// Outstanding email verification token; cleared on verification.
        verification_token -> Nullable<Varchar>,
        /// Outstanding password reset code; cleared once used.
        password_reset_code -> Nullable<Varchar>,
        password_reset_expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Car listings. Soft-deleted rows keep `deleted_at` set.
    cars (id) {
        id -> Uuid,
        host_id -> Uuid,
        make -> Text,
        model -> Text,
        year -> Int4,
        color -> Text,
        price_per_day -> Float8,
        description -> Text,
        image_url -> Nullable<Text>,
        location -> Text,
        features -> Array<Text>,
        is_available -> Bool,
        /// Derived from the car's reviews; rewritten on every new review.
        average_rating -> Float8,
        total_reviews -> Int4,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// The booking ledger.
    bookings (id) {
        id -> Uuid,
        user_id -> Uuid,
        car_id -> Uuid,
        /// Copied from the car at creation.
        host_id -> Uuid,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        total_amount -> Float8,
        driver_license -> Text,
        additional_notes -> Nullable<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One review per completed booking.
    reviews (id) {
        id -> Uuid,
        user_id -> Uuid,
        car_id -> Uuid,
        booking_id -> Uuid,
        rating -> Int2,
        comment -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(cars -> users (host_id));
diesel::joinable!(bookings -> cars (car_id));
diesel::joinable!(reviews -> bookings (booking_id));

diesel::allow_tables_to_appear_in_same_query!(users, cars, bookings, reviews);
