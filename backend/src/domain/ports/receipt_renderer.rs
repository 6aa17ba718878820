//! Port for rendering booking receipts into a downloadable document.
use chrono::{DateTime, Utc};

use crate::domain::{Booking, Car, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised while rendering a receipt.
    pub enum ReceiptRenderError {
        /// The document could not be produced.
        Render { message: String } => "receipt rendering failed: {message}",
    }
}

/// Data printed on a receipt.
#[derive(Debug, Clone)]
pub struct ReceiptContext {
    pub booking: Booking,
    pub customer: User,
    pub car: Car,
    pub issued_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait ReceiptRenderer: Send + Sync {
    /// MIME type of the rendered document.
    fn content_type(&self) -> &'static str;

    /// File extension without the leading dot.
    fn extension(&self) -> &'static str;

    /// Render the receipt to bytes.
    fn render(&self, context: &ReceiptContext) -> Result<Vec<u8>, ReceiptRenderError>;
}
