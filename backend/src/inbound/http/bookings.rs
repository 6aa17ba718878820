//! Booking ledger handlers.
//!
//! ```text
//! POST /api/v1/bookings {"carId":"...","startDate":"2024-06-01","endDate":"2024-06-03",...}
//! GET  /api/v1/bookings
//! PUT  /api/v1/bookings/{id}/status {"status":"confirmed"}
//! GET  /api/v1/bookings/{id}/receipt
//! ```

use actix_web::http::header::{
    CacheControl, CacheDirective, ContentDisposition, DispositionParam, DispositionType,
};
use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    BookingListing, BookingPayload, BookingReceiptRequest, CreateBookingRequest,
    ListBookingsRequest, UpdateBookingStatusRequest,
};
use crate::domain::{BookingId, BookingStatus, CarId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::MessageResponse;
use crate::inbound::http::schemas::{BookingListingSchema, BookingSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_booking_date, parse_id,
};

/// Body for `POST /api/v1/bookings`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    pub car_id: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[schema(example = "2024-06-01")]
    pub start_date: String,
    #[schema(example = "2024-06-03")]
    pub end_date: String,
    #[schema(example = 135.0)]
    pub total_amount: f64,
    pub driver_license: String,
    pub additional_notes: Option<String>,
}

/// Body for `PUT /api/v1/bookings/{id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusBody {
    #[schema(example = "confirmed")]
    pub status: String,
}

fn booking_id_from_path(raw: &str) -> ApiResult<BookingId> {
    parse_id(raw, FieldName::new("bookingId"), |value| BookingId::new(value))
}

/// Reserve a car for a closed date interval.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingBody,
    responses(
        (status = 200, description = "Created booking", body = BookingSchema),
        (status = 400, description = "Invalid request or dates already booked", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only renters can book", body = ErrorSchema),
        (status = 404, description = "Car not available", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "createBooking"
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBookingBody>,
) -> ApiResult<web::Json<BookingPayload>> {
    let actor = session.require_user_id()?;
    let CreateBookingBody {
        car_id,
        start_date,
        end_date,
        total_amount,
        driver_license,
        additional_notes,
    } = payload.into_inner();
    let request = CreateBookingRequest {
        actor,
        car_id: parse_id(&car_id, FieldName::new("carId"), |value| CarId::new(value))?,
        start_date: parse_booking_date(&start_date, FieldName::new("startDate"))?,
        end_date: parse_booking_date(&end_date, FieldName::new("endDate"))?,
        total_amount,
        driver_license,
        additional_notes: additional_notes.filter(|notes| !notes.trim().is_empty()),
    };

    let booking = state.bookings.create_booking(request).await?;
    Ok(web::Json(booking))
}

/// The caller's bookings: made as a renter, or received as a host.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    responses(
        (status = 200, description = "Bookings, newest first", body = [BookingListingSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "listBookings"
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<BookingListing>>> {
    let actor = session.require_user_id()?;
    let bookings = state
        .bookings_query
        .list_bookings(ListBookingsRequest { actor })
        .await?;
    Ok(web::Json(bookings))
}

/// Move a booking through its lifecycle.
#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking identifier")),
    request_body = UpdateBookingStatusBody,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Unknown status or illegal transition", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller may not make this change", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "updateBookingStatus"
)]
#[put("/bookings/{id}/status")]
pub async fn update_booking_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateBookingStatusBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id_from_path(&path.into_inner())?;
    let status = payload
        .into_inner()
        .status
        .trim()
        .parse::<BookingStatus>()
        .map_err(|err| invalid_field_error(FieldName::new("status"), err.to_string()))?;

    state
        .bookings
        .update_status(UpdateBookingStatusRequest {
            actor,
            booking_id,
            status,
        })
        .await?;
    Ok(web::Json(MessageResponse::new(
        "Booking status updated successfully",
    )))
}

/// Download the receipt for one of the caller's bookings.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}/receipt",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Receipt document", content_type = "application/pdf", body = Vec<u8>,
            headers(("Content-Disposition" = String, description = "attachment; filename=receipt_{id}.pdf"))),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the caller's booking", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema)
    ),
    tags = ["bookings"],
    operation_id = "bookingReceipt"
)]
#[get("/bookings/{id}/receipt")]
pub async fn booking_receipt(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id_from_path(&path.into_inner())?;
    let document = state
        .bookings_query
        .booking_receipt(BookingReceiptRequest { actor, booking_id })
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(document.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.filename)],
        })
        .insert_header(CacheControl(vec![CacheDirective::Private, CacheDirective::NoStore]))
        .body(document.bytes))
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
