//! Driving port for booking ledger mutations.
//!
//! Creation runs the availability conflict scan; status updates go through
//! the transition table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Booking, BookingId, BookingStatus, CarId, Error, UserId};

/// Serializable booking payload for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub id: BookingId,
    pub user_id: UserId,
    pub car_id: CarId,
    pub host_id: UserId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub driver_license: String,
    pub additional_notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingPayload {
    fn from(value: Booking) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            car_id: value.car_id,
            host_id: value.host_id,
            start_date: value.period.start(),
            end_date: value.period.end(),
            total_amount: value.terms.total_amount(),
            driver_license: value.terms.driver_license().to_owned(),
            additional_notes: value.terms.additional_notes().map(str::to_owned),
            status: value.status,
            created_at: value.created_at,
        }
    }
}

/// Request to reserve a car for a closed date interval.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBookingRequest {
    pub actor: UserId,
    pub car_id: CarId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub driver_license: String,
    pub additional_notes: Option<String>,
}

/// Request to move a booking to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBookingStatusRequest {
    pub actor: UserId,
    pub booking_id: BookingId,
    pub status: BookingStatus,
}

/// Driving port for booking write operations.
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Reserve a car.
    ///
    /// Fails with `forbidden` for non-renters, `car_unavailable` when the
    /// car is missing or withdrawn, and `conflict` when the period overlaps
    /// a non-terminal booking. The conflict details list every clashing
    /// booking id.
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<BookingPayload, Error>;

    /// Apply a status transition on behalf of the booking's host or renter.
    async fn update_status(&self, request: UpdateBookingStatusRequest) -> Result<(), Error>;
}
