//! Review handlers.
//!
//! ```text
//! POST /api/v1/reviews {"bookingId":"...","carId":"...","rating":5,"comment":"Great"}
//! GET  /api/v1/reviews/car/{id}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::{CreateReviewRequest, ListCarReviewsRequest, ReviewPayload};
use crate::domain::{BookingId, CarId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ReviewSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/reviews`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewBody {
    pub booking_id: String,
    pub car_id: String,
    /// Whole stars from 1 to 5.
    #[schema(example = 5)]
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

/// Review a completed booking.
///
/// The car's average rating is recomputed before the review is returned.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = CreateReviewBody,
    responses(
        (status = 200, description = "Stored review", body = ReviewSchema),
        (status = 400, description = "Invalid, ineligible or duplicate review", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a renter", body = ErrorSchema),
        (status = 404, description = "Booking not found", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateReviewBody>,
) -> ApiResult<web::Json<ReviewPayload>> {
    let actor = session.require_user_id()?;
    let CreateReviewBody {
        booking_id,
        car_id,
        rating,
        comment,
    } = payload.into_inner();
    let request = CreateReviewRequest {
        actor,
        booking_id: parse_id(&booking_id, FieldName::new("bookingId"), |value| {
            BookingId::new(value)
        })?,
        car_id: parse_id(&car_id, FieldName::new("carId"), |value| CarId::new(value))?,
        rating,
        comment,
    };

    let created = state.reviews.create_review(request).await?;
    debug!(
        car_id = %created.review.car_id,
        average_rating = created.car_rating.average_rating,
        total_reviews = created.car_rating.total_reviews,
        "car rating recomputed"
    );
    Ok(web::Json(created.review))
}

/// Reviews of a car, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/reviews/car/{id}",
    params(("id" = String, Path, description = "Car identifier")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewSchema]),
        (status = 400, description = "Malformed identifier", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "listCarReviews",
    security([])
)]
#[get("/reviews/car/{id}")]
pub async fn list_car_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ReviewPayload>>> {
    let raw = path.into_inner();
    let car_id = parse_id(&raw, FieldName::new("carId"), |value| CarId::new(value))?;
    let reviews = state
        .reviews_query
        .list_car_reviews(ListCarReviewsRequest { car_id })
        .await?;
    Ok(web::Json(reviews))
}

#[cfg(test)]
#[path = "reviews_tests.rs"]
mod tests;
