//! Driving port for booking reads and receipts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{BookingId, CarSummary, Error, User, UserId};

use super::BookingPayload;

/// Contact details of the other party to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCard {
    pub name: String,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ContactCard {
    /// Name and phone only, as shown to renters about their host.
    #[must_use]
    pub fn host_of(user: &User) -> Self {
        Self {
            name: user.name().to_string(),
            phone: user.profile().phone.clone(),
            email: None,
        }
    }

    /// Name, phone and email, as shown to hosts about their renter.
    #[must_use]
    pub fn renter_of(user: &User) -> Self {
        Self {
            email: Some(user.email().to_string()),
            ..Self::host_of(user)
        }
    }
}

/// A booking enriched for the caller's bookings page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListing {
    #[serde(flatten)]
    pub booking: BookingPayload,
    pub car: Option<CarSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<ContactCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ContactCard>,
}

/// Request for the caller's bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListBookingsRequest {
    pub actor: UserId,
}

/// Request for a booking receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingReceiptRequest {
    pub actor: UserId,
    pub booking_id: BookingId,
}

/// A rendered receipt ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Driving port for booking read operations.
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Renters see their own bookings; hosts see bookings on their cars.
    /// Newest first.
    async fn list_bookings(
        &self,
        request: ListBookingsRequest,
    ) -> Result<Vec<BookingListing>, Error>;

    /// Render the receipt for one of the renter's bookings.
    async fn booking_receipt(
        &self,
        request: BookingReceiptRequest,
    ) -> Result<ReceiptDocument, Error>;
}
