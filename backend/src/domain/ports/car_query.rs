//! Driving port for car catalogue reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CarId, Error, UserId};

use super::{CarPayload, ReviewPayload};

/// Request for bookable cars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCarsRequest {
    pub location: Option<String>,
}

/// Request for one car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetCarRequest {
    pub car_id: CarId,
}

/// Request for the calling host's cars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMyCarsRequest {
    pub actor: UserId,
}

/// A car with its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDetailsResponse {
    #[serde(flatten)]
    pub car: CarPayload,
    pub reviews: Vec<ReviewPayload>,
}

/// Driving port for car read operations.
#[async_trait]
pub trait CarQuery: Send + Sync {
    /// Available, non-deleted cars matching the optional location filter.
    async fn list_available(&self, request: ListCarsRequest) -> Result<Vec<CarPayload>, Error>;

    /// Any car by id, soft-deleted ones included.
    async fn get_car(&self, request: GetCarRequest) -> Result<CarDetailsResponse, Error>;

    /// Every car owned by the calling host.
    async fn list_my_cars(&self, request: ListMyCarsRequest) -> Result<Vec<CarPayload>, Error>;
}
