//! Port abstraction for the booking ledger.
//!
//! The ledger owns the final availability check. `insert_if_available` must
//! re-run the conflict scan and the car's bookability check inside the same
//! critical section as the insert, so two overlapping requests for one car
//! can never both succeed.
use async_trait::async_trait;

use crate::domain::{Booking, BookingId, BookingStatus, CarId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking ledger adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
        /// The car is missing, withdrawn or marked unavailable.
        CarUnavailable { car_id: CarId } => "car {car_id} is not available for booking",
        /// The requested period overlaps non-terminal bookings.
        Conflict { conflicting: Vec<BookingId> } => "requested period overlaps existing bookings",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomically re-check availability and insert the booking.
    async fn insert_if_available(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;

    /// Fetch a booking by identifier.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Every booking for the car regardless of status.
    async fn list_for_car(&self, car_id: &CarId) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Bookings made by a renter, newest first.
    async fn list_for_renter(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Bookings on a host's cars, newest first.
    async fn list_for_host(&self, host_id: &UserId)
    -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Move a booking to `next` only if it is still in `expected`.
    ///
    /// Returns `false` when the stored status no longer matches.
    async fn transition_status(
        &self,
        id: &BookingId,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<bool, BookingRepositoryError>;
}
