//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod bookings;
pub mod cars;
pub mod error;
pub mod health;
pub mod responses;
pub mod reviews;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler and the extractor configuration that
/// turns malformed input into `invalid_request` payloads.
///
/// Session middleware and application state are left to the caller so the
/// server and the tests can supply their own.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(accounts::register)
        .service(accounts::verify_email)
        .service(accounts::resend_verification)
        .service(accounts::login)
        .service(accounts::forgot_password)
        .service(accounts::reset_password)
        .service(accounts::current_user)
        .service(accounts::change_role)
        .service(accounts::update_profile)
        .service(cars::create_car)
        .service(cars::list_cars)
        .service(cars::list_my_cars)
        .service(cars::get_car)
        .service(cars::update_car)
        .service(cars::delete_car)
        .service(bookings::create_booking)
        .service(bookings::list_bookings)
        .service(bookings::update_booking_status)
        .service(bookings::booking_receipt)
        .service(reviews::create_review)
        .service(reviews::list_car_reviews);
}
