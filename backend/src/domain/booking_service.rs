//! Booking ledger service.
//!
//! Implements the booking driving ports: creation with the availability
//! conflict scan, the status state machine, enriched listings and receipts.
//! The scan runs twice: once here to fail fast with a precise error, and
//! again inside the repository's atomic insert.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    BookingCommand, BookingListing, BookingPayload, BookingQuery, BookingReceiptRequest,
    BookingRepository, CarRepository, ContactCard, CreateBookingRequest, ListBookingsRequest,
    NotificationDispatcher, ReceiptContext, ReceiptDocument, ReceiptRenderer,
    UpdateBookingStatusRequest, UserRepository,
};
use crate::domain::service_support::{
    map_booking_error, map_car_error, map_user_error, notify, require_verified_user,
};
use crate::domain::{
    Booking, BookingConfirmationSnapshot, BookingId, BookingStatus, BookingTerms,
    BookingValidationError, Car, CarId, CompletedRentalSummary, DateRange, Error, Notification,
    NotificationKind, Role, TransitionError, User, UserId, authorize_transition,
    conflicting_bookings,
};

/// Error returned when a requested period overlaps existing bookings.
pub(crate) fn conflict_error(conflicting: &[BookingId]) -> Error {
    Error::conflict("Car is already booked for the selected dates").with_details(json!({
        "code": "booking_conflict",
        "conflictingBookingIds": conflicting,
    }))
}

fn validation_error(error: BookingValidationError) -> Error {
    let field = match error {
        BookingValidationError::EndBeforeStart { .. } => "endDate",
        BookingValidationError::InvalidAmount { .. } => "totalAmount",
        BookingValidationError::MissingDriverLicense => "driverLicense",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

fn transition_error(error: TransitionError) -> Error {
    if error.is_permission() {
        return Error::forbidden(error.to_string());
    }
    let mut details = json!({ "code": "invalid_transition" });
    if let TransitionError::Illegal { from, to } = error {
        details["from"] = json!(from);
        details["to"] = json!(to);
    }
    Error::invalid_request(error.to_string()).with_details(details)
}

fn confirmation_snapshot(booking: &Booking, car: &Car) -> BookingConfirmationSnapshot {
    BookingConfirmationSnapshot {
        booking_id: booking.id,
        car_make: car.details.make().to_owned(),
        car_model: car.details.model().to_owned(),
        car_year: car.details.year(),
        start_date: booking.period.start(),
        end_date: booking.period.end(),
        total_amount: booking.terms.total_amount(),
        location: car.details.location().to_owned(),
    }
}

/// Booking ledger service implementing the booking command and query ports.
#[derive(Clone)]
pub struct BookingService<B, C, U> {
    bookings: Arc<B>,
    cars: Arc<C>,
    users: Arc<U>,
    receipts: Arc<dyn ReceiptRenderer>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl<B, C, U> BookingService<B, C, U> {
    /// Create a booking service over the ledger, catalogue and identity store.
    pub fn new(
        bookings: Arc<B>,
        cars: Arc<C>,
        users: Arc<U>,
        receipts: Arc<dyn ReceiptRenderer>,
        notifier: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            cars,
            users,
            receipts,
            notifier,
            clock,
        }
    }
}

impl<B, C, U> BookingService<B, C, U>
where
    B: BookingRepository,
    C: CarRepository,
    U: UserRepository,
{
    async fn bookable_car(&self, car_id: &CarId) -> Result<Car, Error> {
        self.cars
            .find_by_id(car_id)
            .await
            .map_err(map_car_error)?
            .filter(Car::is_bookable)
            .ok_or_else(|| Error::car_unavailable("Car not available"))
    }

    async fn lookup_user(
        &self,
        cache: &mut HashMap<UserId, Option<User>>,
        id: UserId,
    ) -> Result<Option<User>, Error> {
        if let Some(user) = cache.get(&id) {
            return Ok(user.clone());
        }
        let user = self.users.find_by_id(&id).await.map_err(map_user_error)?;
        cache.insert(id, user.clone());
        Ok(user)
    }

    async fn lookup_car(
        &self,
        cache: &mut HashMap<CarId, Option<Car>>,
        id: CarId,
    ) -> Result<Option<Car>, Error> {
        if let Some(car) = cache.get(&id) {
            return Ok(car.clone());
        }
        let car = self.cars.find_by_id(&id).await.map_err(map_car_error)?;
        cache.insert(id, car.clone());
        Ok(car)
    }

    /// Runs after the status change is committed, so lookup failures are
    /// logged and dropped.
    async fn notify_completion(&self, booking: &Booking) {
        let lookups = (
            self.users.find_by_id(&booking.user_id).await,
            self.cars.find_by_id(&booking.car_id).await,
        );
        let (renter, car) = match lookups {
            (Ok(renter), Ok(car)) => (renter, car),
            (Err(error), _) => {
                warn!(booking_id = %booking.id, %error, "skipping thank-you: renter lookup failed");
                return;
            }
            (_, Err(error)) => {
                warn!(booking_id = %booking.id, %error, "skipping thank-you: car lookup failed");
                return;
            }
        };
        let (Some(renter), Some(car)) = (renter, car) else {
            info!(booking_id = %booking.id, "skipping thank-you: renter or car no longer resolves");
            return;
        };
        let summary = CompletedRentalSummary {
            make: car.details.make().to_owned(),
            model: car.details.model().to_owned(),
        };
        notify(
            self.notifier.as_ref(),
            Notification::new(&renter, NotificationKind::BookingCompleted(summary)),
        )
        .await;
    }
}

#[async_trait]
impl<B, C, U> BookingCommand for BookingService<B, C, U>
where
    B: BookingRepository,
    C: CarRepository,
    U: UserRepository,
{
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<BookingPayload, Error> {
        let renter = require_verified_user(self.users.as_ref(), request.actor).await?;
        if renter.role() != Role::Renter {
            return Err(Error::forbidden("Only renters can make bookings"));
        }

        let period =
            DateRange::new(request.start_date, request.end_date).map_err(validation_error)?;
        let terms = BookingTerms::new(
            request.total_amount,
            request.driver_license,
            request.additional_notes,
        )
        .map_err(validation_error)?;

        let car = self.bookable_car(&request.car_id).await?;

        let existing = self
            .bookings
            .list_for_car(&car.id)
            .await
            .map_err(map_booking_error)?;
        let conflicts = conflicting_bookings(&period, &existing);
        if !conflicts.is_empty() {
            return Err(conflict_error(&conflicts));
        }

        let booking = Booking {
            id: BookingId::random(),
            user_id: renter.id(),
            car_id: car.id,
            host_id: car.host_id,
            period,
            terms,
            status: BookingStatus::Confirmed,
            created_at: self.clock.utc(),
        };
        self.bookings
            .insert_if_available(&booking)
            .await
            .map_err(map_booking_error)?;
        info!(booking_id = %booking.id, car_id = %car.id, "booking confirmed");

        let snapshot = confirmation_snapshot(&booking, &car);
        notify(
            self.notifier.as_ref(),
            Notification::new(&renter, NotificationKind::BookingConfirmed(snapshot)),
        )
        .await;

        Ok(BookingPayload::from(booking))
    }

    async fn update_status(&self, request: UpdateBookingStatusRequest) -> Result<(), Error> {
        let actor = require_verified_user(self.users.as_ref(), request.actor).await?;
        let booking = self
            .bookings
            .find_by_id(&request.booking_id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| Error::not_found("Booking not found"))?;

        authorize_transition(&booking, &actor, request.status).map_err(transition_error)?;

        let applied = self
            .bookings
            .transition_status(&booking.id, booking.status, request.status)
            .await
            .map_err(map_booking_error)?;
        if !applied {
            return Err(Error::conflict(
                "Booking status changed while the update was in progress",
            ));
        }
        info!(
            booking_id = %booking.id,
            from = %booking.status,
            to = %request.status,
            "booking status updated"
        );

        if request.status == BookingStatus::Completed {
            self.notify_completion(&booking).await;
        }
        Ok(())
    }
}

#[async_trait]
impl<B, C, U> BookingQuery for BookingService<B, C, U>
where
    B: BookingRepository,
    C: CarRepository,
    U: UserRepository,
{
    async fn list_bookings(
        &self,
        request: ListBookingsRequest,
    ) -> Result<Vec<BookingListing>, Error> {
        let actor = require_verified_user(self.users.as_ref(), request.actor).await?;
        let bookings = match actor.role() {
            Role::Renter => self.bookings.list_for_renter(&actor.id()).await,
            Role::Host => self.bookings.list_for_host(&actor.id()).await,
        }
        .map_err(map_booking_error)?;

        let mut users = HashMap::new();
        let mut cars = HashMap::new();
        let mut listings = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let car = self
                .lookup_car(&mut cars, booking.car_id)
                .await?
                .map(|car| car.summary());
            let (host, user) = match actor.role() {
                Role::Renter => {
                    let host = self.lookup_user(&mut users, booking.host_id).await?;
                    (host.as_ref().map(ContactCard::host_of), None)
                }
                Role::Host => {
                    let renter = self.lookup_user(&mut users, booking.user_id).await?;
                    (None, renter.as_ref().map(ContactCard::renter_of))
                }
            };
            listings.push(BookingListing {
                booking: BookingPayload::from(booking),
                car,
                host,
                user,
            });
        }
        Ok(listings)
    }

    async fn booking_receipt(
        &self,
        request: BookingReceiptRequest,
    ) -> Result<ReceiptDocument, Error> {
        let customer = require_verified_user(self.users.as_ref(), request.actor).await?;
        let booking = self
            .bookings
            .find_by_id(&request.booking_id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| Error::not_found("Booking not found"))?;
        if booking.user_id != customer.id() {
            return Err(Error::forbidden(
                "Only the renter of this booking can download its receipt",
            ));
        }
        let car = self
            .cars
            .find_by_id(&booking.car_id)
            .await
            .map_err(map_car_error)?
            .ok_or_else(|| Error::not_found("Car not found"))?;

        let filename = format!("receipt_{}.{}", booking.id, self.receipts.extension());
        let context = ReceiptContext {
            booking,
            customer,
            car,
            issued_at: self.clock.utc(),
        };
        let bytes = self
            .receipts
            .render(&context)
            .map_err(|err| Error::internal(err.to_string()))?;

        Ok(ReceiptDocument {
            filename,
            content_type: self.receipts.content_type(),
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
