//! Driving port for review submission.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BookingId, CarId, Error, RatingSummary, Review, ReviewId, UserId};

/// Serializable review payload with the reviewer's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub id: ReviewId,
    pub user_id: UserId,
    pub user_name: String,
    pub car_id: CarId,
    pub booking_id: BookingId,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Reviewer name used when the author no longer resolves.
pub const ANONYMOUS_REVIEWER: &str = "Anonymous";

impl ReviewPayload {
    /// Combine a review with its author's name.
    #[must_use]
    pub fn new(review: Review, user_name: Option<String>) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            user_name: user_name.unwrap_or_else(|| ANONYMOUS_REVIEWER.to_owned()),
            car_id: review.car_id,
            booking_id: review.booking_id,
            rating: review.rating.value(),
            comment: review.comment.into(),
            created_at: review.created_at,
        }
    }
}

/// Request to review a completed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReviewRequest {
    pub actor: UserId,
    pub booking_id: BookingId,
    pub car_id: CarId,
    pub rating: i64,
    pub comment: String,
}

/// The stored review and the car's recomputed rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewResponse {
    pub review: ReviewPayload,
    pub car_rating: RatingSummary,
}

/// Driving port for review write operations.
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// Review a completed booking once.
    async fn create_review(&self, request: CreateReviewRequest)
    -> Result<CreateReviewResponse, Error>;
}
