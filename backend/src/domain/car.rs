//! Car catalogue entities.
//!
//! A car belongs to exactly one host. Its rating fields are derived from
//! reviews and only ever written by the review aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CarId, RatingSummary, UserId};

/// Earliest model year accepted for a listing.
pub const MODEL_YEAR_MIN: i32 = 1900;
/// Latest model year accepted for a listing.
pub const MODEL_YEAR_MAX: i32 = 2100;

/// Validation errors for car details.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CarValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    /// Model year outside the accepted range.
    #[error("year must be between 1900 and 2100, got {year}")]
    YearOutOfRange { year: i32 },
    /// Price was zero, negative or not finite.
    #[error("price per day must be a positive amount, got {price}")]
    InvalidPrice { price: f64 },
}

impl CarValidationError {
    /// Field the error refers to, for client-facing details.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
            Self::YearOutOfRange { .. } => "year",
            Self::InvalidPrice { .. } => "pricePerDay",
        }
    }
}

/// Unvalidated listing attributes supplied by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDetailsDraft {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub price_per_day: f64,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub features: Vec<String>,
}

/// Host-editable listing attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct CarDetails {
    make: String,
    model: String,
    year: i32,
    color: String,
    price_per_day: f64,
    description: String,
    image_url: Option<String>,
    location: String,
    features: Vec<String>,
}

fn required(value: String, field: &'static str) -> Result<String, CarValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CarValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

impl CarDetails {
    /// Validate a draft.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{CarDetails, CarDetailsDraft};
    ///
    /// let details = CarDetails::new(CarDetailsDraft {
    ///     make: "Toyota".into(),
    ///     model: "Corolla".into(),
    ///     year: 2021,
    ///     color: "Blue".into(),
    ///     price_per_day: 45.0,
    ///     description: "Reliable commuter".into(),
    ///     image_url: None,
    ///     location: "Lisbon".into(),
    ///     features: vec!["Bluetooth".into()],
    /// })
    /// .expect("valid details");
    /// assert_eq!(details.make(), "Toyota");
    /// ```
    pub fn new(draft: CarDetailsDraft) -> Result<Self, CarValidationError> {
        let CarDetailsDraft {
            make,
            model,
            year,
            color,
            price_per_day,
            description,
            image_url,
            location,
            features,
        } = draft;

        if !(MODEL_YEAR_MIN..=MODEL_YEAR_MAX).contains(&year) {
            return Err(CarValidationError::YearOutOfRange { year });
        }
        if !price_per_day.is_finite() || price_per_day <= 0.0 {
            return Err(CarValidationError::InvalidPrice {
                price: price_per_day,
            });
        }

        Ok(Self {
            make: required(make, "make")?,
            model: required(model, "model")?,
            year,
            color: required(color, "color")?,
            price_per_day,
            description: description.trim().to_owned(),
            image_url: image_url
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty()),
            location: required(location, "location")?,
            features: features
                .into_iter()
                .map(|feature| feature.trim().to_owned())
                .filter(|feature| !feature.is_empty())
                .collect(),
        })
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn price_per_day(&self) -> f64 {
        self.price_per_day
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }
}

/// A host's listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub id: CarId,
    pub host_id: UserId,
    pub details: CarDetails,
    pub is_available: bool,
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Car {
    /// Create a fresh, available listing with no reviews.
    #[must_use]
    pub fn list(host_id: UserId, details: CarDetails, now: DateTime<Utc>) -> Self {
        Self {
            id: CarId::random(),
            host_id,
            details,
            is_available: true,
            rating: RatingSummary::default(),
            created_at: now,
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Whether the listing can currently take bookings.
    #[must_use]
    pub fn is_bookable(&self) -> bool {
        self.is_available && self.deleted_at.is_none()
    }

    /// Whether the listing belongs to `user_id`.
    #[must_use]
    pub fn is_hosted_by(&self, user_id: UserId) -> bool {
        self.host_id == user_id
    }

    /// Compact projection used in booking listings.
    #[must_use]
    pub fn summary(&self) -> CarSummary {
        CarSummary {
            id: self.id,
            make: self.details.make().to_owned(),
            model: self.details.model().to_owned(),
            year: self.details.year(),
            price_per_day: self.details.price_per_day(),
            location: self.details.location().to_owned(),
            image_url: self.details.image_url().map(str::to_owned),
        }
    }
}

/// Compact car projection embedded in booking listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSummary {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price_per_day: f64,
    pub location: String,
    pub image_url: Option<String>,
}
