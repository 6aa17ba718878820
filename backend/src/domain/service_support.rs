//! Helpers shared by the marketplace services: port error mapping, actor
//! resolution and best-effort notification.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::ports::{
    BookingRepositoryError, CarRepositoryError, NotificationDispatcher, ReviewPayload,
    ReviewRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, Notification, Review, User, UserId};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::invalid_request("email already registered")
        }
    }
}

pub(crate) fn map_car_error(error: CarRepositoryError) -> Error {
    match error {
        CarRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("car repository unavailable: {message}"))
        }
        CarRepositoryError::Query { message } => {
            Error::internal(format!("car repository error: {message}"))
        }
    }
}

pub(crate) fn map_booking_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking repository error: {message}"))
        }
        BookingRepositoryError::CarUnavailable { .. } => {
            Error::car_unavailable("Car not available")
        }
        BookingRepositoryError::Conflict { conflicting } => {
            crate::domain::booking_service::conflict_error(&conflicting)
        }
    }
}

pub(crate) fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewRepositoryError::DuplicateReview { .. } => {
            Error::conflict("You have already reviewed this booking")
        }
    }
}

/// Resolve the session's user, insisting on a confirmed email address.
pub(crate) async fn require_verified_user<U>(users: &U, id: UserId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    let user = users
        .find_by_id(&id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    if !user.is_verified() {
        return Err(Error::forbidden(
            "Please verify your email address before continuing",
        ));
    }
    Ok(user)
}

/// Hand a notification to the dispatcher, logging instead of failing.
pub(crate) async fn notify(dispatcher: &dyn NotificationDispatcher, notification: Notification) {
    let kind = notification.kind.label();
    match dispatcher.dispatch(notification).await {
        Ok(()) => info!(kind, "notification handed off"),
        Err(error) => warn!(kind, %error, "notification dropped"),
    }
}

/// Attach author names to reviews, falling back to
/// [`crate::domain::ports::ANONYMOUS_REVIEWER`] for authors that no longer resolve.
pub(crate) async fn review_payloads<U>(
    users: &U,
    reviews: Vec<Review>,
) -> Result<Vec<ReviewPayload>, Error>
where
    U: UserRepository + ?Sized,
{
    let mut names: HashMap<UserId, Option<String>> = HashMap::new();
    let mut payloads = Vec::with_capacity(reviews.len());
    for review in reviews {
        let name = match names.get(&review.user_id) {
            Some(name) => name.clone(),
            None => {
                let name = users
                    .find_by_id(&review.user_id)
                    .await
                    .map_err(map_user_error)?
                    .map(|user| user.name().to_string());
                names.insert(review.user_id, name.clone());
                name
            }
        };
        payloads.push(ReviewPayload::new(review, name));
    }
    Ok(payloads)
}
