//! Notification dispatcher adapters.
//!
//! - [`ConsoleNotificationDispatcher`] logs rendered messages.
//! - [`SmtpNotificationDispatcher`] delivers HTML email through `lettre`.
//! - [`BackgroundNotificationDispatcher`] makes either of them
//!   fire-and-forget.

mod background;
mod console;
mod smtp;
mod templates;

pub use background::BackgroundNotificationDispatcher;
pub use console::ConsoleNotificationDispatcher;
pub use smtp::{SmtpNotificationDispatcher, SmtpSettings};
pub use templates::{EmailContent, render as render_email};
