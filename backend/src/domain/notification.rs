//! Outbound user notifications.
//!
//! Notifications are values describing what to tell whom. Rendering into a
//! concrete channel (email, console) is an adapter concern.

use super::{
    BookingConfirmationSnapshot, CompletedRentalSummary, EmailAddress, ResetCode, Role, User,
    VerificationToken,
};

/// Who receives a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: EmailAddress,
    pub name: String,
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            email: user.email().clone(),
            name: user.name().as_ref().to_owned(),
        }
    }
}

/// What the notification is about.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    /// Ask a new account holder to confirm their address.
    Verification { token: VerificationToken },
    /// Greet a user whose address was just confirmed.
    Welcome { role: Role },
    /// Mail a one-time code for resetting a forgotten password.
    PasswordReset {
        code: ResetCode,
        valid_for_minutes: i64,
    },
    /// Tell a renter their booking is confirmed.
    BookingConfirmed(BookingConfirmationSnapshot),
    /// Thank a renter once their rental is completed.
    BookingCompleted(CompletedRentalSummary),
}

impl NotificationKind {
    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Verification { .. } => "verification",
            Self::Welcome { .. } => "welcome",
            Self::PasswordReset { .. } => "password_reset",
            Self::BookingConfirmed(_) => "booking_confirmed",
            Self::BookingCompleted(_) => "booking_completed",
        }
    }
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient: Recipient,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(recipient: impl Into<Recipient>, kind: NotificationKind) -> Self {
        Self {
            recipient: recipient.into(),
            kind,
        }
    }
}
