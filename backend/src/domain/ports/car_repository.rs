//! Port abstraction for the car catalogue store.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Car, CarDetails, CarId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by car repository adapters.
    pub enum CarRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "car repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "car repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Insert a new listing.
    async fn create(&self, car: &Car) -> Result<(), CarRepositoryError>;

    /// Fetch a listing by identifier, soft-deleted or not.
    async fn find_by_id(&self, id: &CarId) -> Result<Option<Car>, CarRepositoryError>;

    /// Listings currently open for booking, optionally filtered by a
    /// case-insensitive location substring.
    async fn list_available(
        &self,
        location: Option<String>,
    ) -> Result<Vec<Car>, CarRepositoryError>;

    /// Every listing owned by the host, including soft-deleted ones.
    async fn list_by_host(&self, host_id: &UserId) -> Result<Vec<Car>, CarRepositoryError>;

    /// Replace the editable attributes and stamp `updated_at`.
    async fn update_details(
        &self,
        id: &CarId,
        details: &CarDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Car>, CarRepositoryError>;

    /// Withdraw a listing that still has booking history.
    async fn soft_delete(
        &self,
        id: &CarId,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), CarRepositoryError>;

    /// Remove a listing together with its bookings and reviews.
    async fn delete(&self, id: &CarId) -> Result<(), CarRepositoryError>;
}
