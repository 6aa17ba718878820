//! Driving port for review reads.

use async_trait::async_trait;

use crate::domain::{CarId, Error};

use super::ReviewPayload;

/// Request for a car's reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCarReviewsRequest {
    pub car_id: CarId,
}

/// Driving port for review read operations.
#[async_trait]
pub trait ReviewQuery: Send + Sync {
    /// Reviews of a car, newest first.
    async fn list_car_reviews(
        &self,
        request: ListCarReviewsRequest,
    ) -> Result<Vec<ReviewPayload>, Error>;
}
