//! Port abstraction for reviews and the car rating aggregate.
use async_trait::async_trait;

use crate::domain::{BookingId, CarId, RatingSummary, Review};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
        /// The booking already has a review.
        DuplicateReview { booking_id: BookingId } => "booking {booking_id} already has a review",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Store the review and recompute the car's rating from every review of
    /// that car, in one atomic step. Returns the new summary.
    async fn insert_and_recompute(
        &self,
        review: &Review,
    ) -> Result<RatingSummary, ReviewRepositoryError>;

    /// The review attached to a booking, if any.
    async fn find_by_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Reviews of a car, newest first.
    async fn list_for_car(&self, car_id: &CarId) -> Result<Vec<Review>, ReviewRepositoryError>;
}
