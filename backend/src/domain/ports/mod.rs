//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, dispatcher, renderer, hasher) are implemented
//! by outbound adapters. Driving ports (commands and queries) are implemented
//! by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod booking_command;
mod booking_query;
mod booking_repository;
mod car_command;
mod car_query;
mod car_repository;
mod notification_dispatcher;
mod password_hasher;
mod receipt_renderer;
mod review_command;
mod review_query;
mod review_repository;
mod user_repository;

pub use account_command::{
    AccountCommand, ChangeRoleRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResendVerificationRequest, ResetPasswordRequest, UpdateProfileRequest, UserPayload,
    VerifyEmailRequest,
};
pub use account_query::AccountQuery;
pub use booking_command::{
    BookingCommand, BookingPayload, CreateBookingRequest, UpdateBookingStatusRequest,
};
pub use booking_query::{
    BookingListing, BookingQuery, BookingReceiptRequest, ContactCard, ListBookingsRequest,
    ReceiptDocument,
};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, BookingRepositoryError};
pub use car_command::{
    CarCommand, CarPayload, CarRemoval, CreateCarRequest, RemoveCarRequest, UpdateCarRequest,
};
pub use car_query::{CarDetailsResponse, CarQuery, GetCarRequest, ListCarsRequest, ListMyCarsRequest};
#[cfg(test)]
pub use car_repository::MockCarRepository;
pub use car_repository::{CarRepository, CarRepositoryError};
#[cfg(test)]
pub use notification_dispatcher::MockNotificationDispatcher;
pub use notification_dispatcher::{
    NoOpNotificationDispatcher, NotificationDispatcher, NotificationError,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use receipt_renderer::MockReceiptRenderer;
pub use receipt_renderer::{ReceiptContext, ReceiptRenderError, ReceiptRenderer};
pub use review_command::{
    ANONYMOUS_REVIEWER, CreateReviewRequest, CreateReviewResponse, ReviewCommand, ReviewPayload,
};
pub use review_query::{ListCarReviewsRequest, ReviewQuery};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUserRecord, UserPersistenceError, UserRepository};
