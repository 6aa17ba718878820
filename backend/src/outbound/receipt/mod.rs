//! Receipt renderer adapters.

mod pdf;

pub use pdf::PdfReceiptRenderer;
