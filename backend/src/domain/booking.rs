//! Booking ledger entities and the availability conflict scan.
//!
//! Booking periods are closed intervals: a booking ending on a given instant
//! conflicts with one starting on that same instant. Only bookings in a
//! non-terminal status occupy a car's calendar.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, CarId, UserId};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Statuses that still occupy the car's calendar.
    pub const NON_TERMINAL: [Self; 3] = [Self::Pending, Self::Confirmed, Self::Active];

    /// Statuses that block edits to the car's listing.
    pub const EDIT_BLOCKING: [Self; 2] = [Self::Confirmed, Self::Active];

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown booking status '{value}'")]
pub struct ParseBookingStatusError {
    value: String,
}

impl std::str::FromStr for BookingStatus {
    type Err = ParseBookingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseBookingStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validation errors for booking input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookingValidationError {
    /// The period ends before it starts.
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The total amount is negative or not finite.
    #[error("total amount must be a non-negative number, got {amount}")]
    InvalidAmount { amount: f64 },
    /// The driver licence number is blank.
    #[error("driver license must not be empty")]
    MissingDriverLicense,
}

/// Closed booking interval `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Validate that the period does not end before it starts.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::DateRange;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    /// let end = Utc.with_ymd_and_hms(2024, 6, 5, 0, 0, 0).unwrap();
    /// assert!(DateRange::new(start, end).is_ok());
    /// assert!(DateRange::new(end, start).is_err());
    /// ```
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, BookingValidationError> {
        if end < start {
            return Err(BookingValidationError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Closed-interval overlap: `S <= E' && S' <= E`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whole days billed for the period, counting both ends, at least one.
    #[must_use]
    pub fn rental_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }
}

/// Renter-supplied booking fields beyond the car and period.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingTerms {
    total_amount: f64,
    driver_license: String,
    additional_notes: Option<String>,
}

impl BookingTerms {
    /// Validate the amount and licence.
    pub fn new(
        total_amount: f64,
        driver_license: impl Into<String>,
        additional_notes: Option<String>,
    ) -> Result<Self, BookingValidationError> {
        if !total_amount.is_finite() || total_amount < 0.0 {
            return Err(BookingValidationError::InvalidAmount {
                amount: total_amount,
            });
        }
        let driver_license = driver_license.into().trim().to_owned();
        if driver_license.is_empty() {
            return Err(BookingValidationError::MissingDriverLicense);
        }
        Ok(Self {
            total_amount,
            driver_license,
            additional_notes: additional_notes
                .map(|notes| notes.trim().to_owned())
                .filter(|notes| !notes.is_empty()),
        })
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn driver_license(&self) -> &str {
        &self.driver_license
    }

    pub fn additional_notes(&self) -> Option<&str> {
        self.additional_notes.as_deref()
    }
}

/// A reservation of one car by one renter.
///
/// `host_id` is copied from the car when the booking is created and is never
/// re-derived from the car afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub car_id: CarId,
    pub host_id: UserId,
    pub period: DateRange,
    pub terms: BookingTerms,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking still occupies its car's calendar.
    #[must_use]
    pub fn blocks_calendar(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Every non-terminal booking in `existing` whose period overlaps `candidate`.
///
/// The scan visits every record; callers receive all conflicts, not only the
/// first one found.
///
/// # Examples
/// ```
/// use backend::domain::{Booking, DateRange, conflicting_bookings};
/// use chrono::{TimeZone, Utc};
///
/// let day = |d| Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap();
/// let candidate = DateRange::new(day(4), day(10)).expect("valid range");
/// let existing: Vec<Booking> = Vec::new();
/// assert!(conflicting_bookings(&candidate, &existing).is_empty());
/// ```
#[must_use]
pub fn conflicting_bookings<'a>(
    candidate: &DateRange,
    existing: impl IntoIterator<Item = &'a Booking>,
) -> Vec<BookingId> {
    existing
        .into_iter()
        .filter(|booking| booking.blocks_calendar() && booking.period.overlaps(candidate))
        .map(|booking| booking.id)
        .collect()
}

/// Car and booking fields captured when a booking is confirmed.
///
/// Taken at creation time so later car edits do not alter what the renter
/// was told.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmationSnapshot {
    pub booking_id: BookingId,
    pub car_make: String,
    pub car_model: String,
    pub car_year: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub location: String,
}

/// Car identity included in the thank-you notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRentalSummary {
    pub make: String,
    pub model: String,
}

#[cfg(test)]
#[path = "booking_tests.rs"]
mod tests;
