//! Reviews and the derived car rating aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, CarId, ReviewId, UserId};

/// Lowest star rating.
pub const RATING_MIN: u8 = 1;
/// Highest star rating.
pub const RATING_MAX: u8 = 5;
/// Maximum review comment length in characters.
pub const COMMENT_MAX: usize = 2000;

/// Validation errors for review input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Rating outside 1..=5.
    #[error("rating must be between 1 and 5, got {value}")]
    RatingOutOfRange { value: i64 },
    /// Comment longer than [`COMMENT_MAX`].
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
}

/// Whole-star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    /// Validate a rating value.
    pub fn new(value: i64) -> Result<Self, ReviewValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|stars| (RATING_MIN..=RATING_MAX).contains(stars))
            .map(Self)
            .ok_or(ReviewValidationError::RatingOutOfRange { value })
    }

    /// Number of stars.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(value: Rating) -> Self {
        Self::from(value.0)
    }
}

/// Free-text review comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewComment(String);

impl ReviewComment {
    /// Accept a trimmed comment of at most [`COMMENT_MAX`] characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.chars().count() > COMMENT_MAX {
            return Err(ReviewValidationError::CommentTooLong { max: COMMENT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ReviewComment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ReviewComment> for String {
    fn from(value: ReviewComment) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReviewComment {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A renter's review of a completed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub car_id: CarId,
    pub booking_id: BookingId,
    pub rating: Rating,
    pub comment: ReviewComment,
    pub created_at: DateTime<Utc>,
}

/// Derived rating fields stored on a car.
///
/// Always recomputed from the full set of ratings; never patched
/// incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: u32,
}

impl RatingSummary {
    /// Mean of all ratings rounded to one decimal place, plus the count.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Rating, RatingSummary};
    ///
    /// let ratings = [4, 5, 3].map(|stars| Rating::new(stars).expect("valid rating"));
    /// let summary = RatingSummary::from_ratings(&ratings);
    /// assert_eq!(summary.average_rating, 4.0);
    /// assert_eq!(summary.total_reviews, 3);
    /// ```
    #[must_use]
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let total: u32 = ratings.iter().map(|rating| u32::from(rating.value())).sum();
        let count = u32::try_from(ratings.len()).unwrap_or(u32::MAX);
        let mean = f64::from(total) / f64::from(count);
        Self {
            average_rating: (mean * 10.0).round() / 10.0,
            total_reviews: count,
        }
    }
}
