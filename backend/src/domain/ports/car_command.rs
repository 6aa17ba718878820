//! Driving port for car listing mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Car, CarDetailsDraft, CarId, Error, UserId};

/// Serializable car payload for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarPayload {
    pub id: CarId,
    pub host_id: UserId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub price_per_day: f64,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub features: Vec<String>,
    pub is_available: bool,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Car> for CarPayload {
    fn from(value: Car) -> Self {
        let details = &value.details;
        Self {
            id: value.id,
            host_id: value.host_id,
            make: details.make().to_owned(),
            model: details.model().to_owned(),
            year: details.year(),
            color: details.color().to_owned(),
            price_per_day: details.price_per_day(),
            description: details.description().to_owned(),
            image_url: details.image_url().map(str::to_owned),
            location: details.location().to_owned(),
            features: details.features().to_vec(),
            is_available: value.is_available,
            average_rating: value.rating.average_rating,
            total_reviews: value.rating.total_reviews,
            created_at: value.created_at,
            updated_at: value.updated_at,
            deleted_at: value.deleted_at,
        }
    }
}

/// Request to list a new car.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCarRequest {
    pub actor: UserId,
    pub details: CarDetailsDraft,
}

/// Request to replace a car's listing attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCarRequest {
    pub actor: UserId,
    pub car_id: CarId,
    pub details: CarDetailsDraft,
}

/// Request to remove a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveCarRequest {
    pub actor: UserId,
    pub car_id: CarId,
}

/// How a removal was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarRemoval {
    /// The car and its dependants are gone.
    Deleted,
    /// Booking history exists, so the car was withdrawn instead.
    SoftDeleted,
}

impl CarRemoval {
    /// Human-readable outcome for the client.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Deleted => "Car deleted successfully",
            Self::SoftDeleted => "Car marked as unavailable due to booking history",
        }
    }
}

/// Driving port for car write operations.
#[async_trait]
pub trait CarCommand: Send + Sync {
    /// List a car for the calling host.
    async fn create_car(&self, request: CreateCarRequest) -> Result<CarPayload, Error>;

    /// Edit a car unless it has confirmed or active bookings.
    async fn update_car(&self, request: UpdateCarRequest) -> Result<CarPayload, Error>;

    /// Remove a car, soft-deleting it when completed bookings exist.
    async fn remove_car(&self, request: RemoveCarRequest) -> Result<CarRemoval, Error>;
}
