//! Domain primitives, aggregates and services.
//!
//! Purpose: define the marketplace entities (users, cars, bookings, reviews)
//! with their invariants, the booking conflict scan and status transition
//! table, and the services that implement the driving ports. Types keep
//! their fields private where an invariant must hold and document their
//! serialisation contracts (serde) in Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Booking, DateRange, BookingStatus: the booking ledger model.
//! - conflicting_bookings: the full availability scan.
//! - authorize_transition: the status transition table.

pub mod account_service;
pub mod booking;
pub mod booking_service;
pub mod booking_transitions;
pub mod car;
pub mod car_service;
pub mod error;
pub mod ids;
pub mod notification;
pub mod ports;
pub mod review;
pub mod review_service;
mod service_support;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::booking::{
    Booking, BookingConfirmationSnapshot, BookingStatus, BookingTerms, BookingValidationError,
    CompletedRentalSummary, DateRange, ParseBookingStatusError, conflicting_bookings,
};
pub use self::booking_service::BookingService;
pub use self::booking_transitions::{
    TransitionError, authorize_transition, is_legal as is_legal_transition,
};
pub use self::car::{
    Car, CarDetails, CarDetailsDraft, CarSummary, CarValidationError, MODEL_YEAR_MAX,
    MODEL_YEAR_MIN,
};
pub use self::car_service::CarService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{BookingId, CarId, IdValidationError, ReviewId, UserId};
pub use self::notification::{Notification, NotificationKind, Recipient};
pub use self::review::{
    COMMENT_MAX, RATING_MAX, RATING_MIN, Rating, RatingSummary, Review, ReviewComment,
    ReviewValidationError,
};
pub use self::review_service::ReviewService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, PASSWORD_MIN, PERSON_NAME_MAX, Password, PasswordHash, PasswordResetGrant,
    PersonName, RESET_CODE_LEN, ResetCode, Role, User, UserDraft, UserProfile, UserUpdate,
    UserValidationError, VerificationToken,
};
