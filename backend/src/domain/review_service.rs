//! Review aggregator service.
//!
//! Only the renter of a completed booking may review it, once, and only
//! while still holding the renter role. Storing the
//! review and recomputing the car's rating happen in one repository call.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    BookingRepository, CreateReviewRequest, CreateReviewResponse, ListCarReviewsRequest,
    ReviewCommand, ReviewPayload, ReviewQuery, ReviewRepository, UserRepository,
};
use crate::domain::service_support::{
    map_booking_error, map_review_error, require_verified_user, review_payloads,
};
use crate::domain::{
    BookingStatus, Error, Rating, Review, ReviewComment, ReviewId, ReviewValidationError, Role,
};

fn validation_error(error: ReviewValidationError) -> Error {
    let field = match error {
        ReviewValidationError::RatingOutOfRange { .. } => "rating",
        ReviewValidationError::CommentTooLong { .. } => "comment",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

/// Review service implementing the review command and query ports.
#[derive(Clone)]
pub struct ReviewService<R, B, U> {
    reviews: Arc<R>,
    bookings: Arc<B>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, B, U> ReviewService<R, B, U> {
    /// Create a review service.
    pub fn new(reviews: Arc<R>, bookings: Arc<B>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reviews,
            bookings,
            users,
            clock,
        }
    }
}

#[async_trait]
impl<R, B, U> ReviewCommand for ReviewService<R, B, U>
where
    R: ReviewRepository,
    B: BookingRepository,
    U: UserRepository,
{
    async fn create_review(
        &self,
        request: CreateReviewRequest,
    ) -> Result<CreateReviewResponse, Error> {
        let reviewer = require_verified_user(self.users.as_ref(), request.actor).await?;
        if reviewer.role() != Role::Renter {
            return Err(Error::forbidden("Only renters can review their rentals"));
        }
        let rating = Rating::new(request.rating).map_err(validation_error)?;
        let comment = ReviewComment::new(request.comment).map_err(validation_error)?;

        let booking = self
            .bookings
            .find_by_id(&request.booking_id)
            .await
            .map_err(map_booking_error)?
            .filter(|booking| booking.user_id == reviewer.id())
            .ok_or_else(|| Error::not_found("Booking not found"))?;
        if booking.car_id != request.car_id {
            return Err(
                Error::invalid_request("Booking is for a different car").with_details(json!({
                    "field": "carId",
                    "code": "car_mismatch",
                })),
            );
        }
        if booking.status != BookingStatus::Completed {
            return Err(Error::not_eligible(
                "Only completed bookings can be reviewed",
            ));
        }
        if self
            .reviews
            .find_by_booking(&booking.id)
            .await
            .map_err(map_review_error)?
            .is_some()
        {
            return Err(Error::conflict("You have already reviewed this booking"));
        }

        let review = Review {
            id: ReviewId::random(),
            user_id: reviewer.id(),
            car_id: booking.car_id,
            booking_id: booking.id,
            rating,
            comment,
            created_at: self.clock.utc(),
        };
        let car_rating = self
            .reviews
            .insert_and_recompute(&review)
            .await
            .map_err(map_review_error)?;
        info!(
            review_id = %review.id,
            car_id = %review.car_id,
            average = car_rating.average_rating,
            "review stored"
        );

        Ok(CreateReviewResponse {
            review: ReviewPayload::new(review, Some(reviewer.name().to_string())),
            car_rating,
        })
    }
}

#[async_trait]
impl<R, B, U> ReviewQuery for ReviewService<R, B, U>
where
    R: ReviewRepository,
    B: BookingRepository,
    U: UserRepository,
{
    async fn list_car_reviews(
        &self,
        request: ListCarReviewsRequest,
    ) -> Result<Vec<ReviewPayload>, Error> {
        let reviews = self
            .reviews
            .list_for_car(&request.car_id)
            .await
            .map_err(map_review_error)?;
        review_payloads(self.users.as_ref(), reviews).await
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
