//! Car catalogue service.
//!
//! Listing edits and removals are guarded by the car's bookings: confirmed or
//! active bookings block edits, any non-terminal booking blocks removal, and
//! completed history turns removal into a soft delete.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    BookingRepository, CarCommand, CarDetailsResponse, CarPayload, CarQuery, CarRemoval,
    CarRepository, CreateCarRequest, GetCarRequest, ListCarsRequest, ListMyCarsRequest,
    RemoveCarRequest, ReviewRepository, UpdateCarRequest, UserRepository,
};
use crate::domain::service_support::{
    map_booking_error, map_car_error, map_review_error, require_verified_user, review_payloads,
};
use crate::domain::{
    Booking, BookingStatus, Car, CarDetails, CarDetailsDraft, CarId, CarValidationError, Error,
    Role, User, UserId,
};

fn validation_error(error: CarValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_car_details",
    }))
}

fn parse_details(draft: CarDetailsDraft) -> Result<CarDetails, Error> {
    CarDetails::new(draft).map_err(validation_error)
}

fn require_host(user: &User, action: &str) -> Result<(), Error> {
    match user.role() {
        Role::Host => Ok(()),
        Role::Renter => Err(Error::forbidden(format!("Only hosts can {action}"))),
    }
}

fn any_in(bookings: &[Booking], statuses: &[BookingStatus]) -> bool {
    bookings
        .iter()
        .any(|booking| statuses.contains(&booking.status))
}

/// Car catalogue service implementing the car command and query ports.
#[derive(Clone)]
pub struct CarService<C, B, R, U> {
    cars: Arc<C>,
    bookings: Arc<B>,
    reviews: Arc<R>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C, B, R, U> CarService<C, B, R, U> {
    /// Create a car service over the catalogue and its dependants.
    pub fn new(
        cars: Arc<C>,
        bookings: Arc<B>,
        reviews: Arc<R>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cars,
            bookings,
            reviews,
            users,
            clock,
        }
    }
}

impl<C, B, R, U> CarService<C, B, R, U>
where
    C: CarRepository,
    B: BookingRepository,
    R: ReviewRepository,
    U: UserRepository,
{
    /// Load a car the acting host owns, with its bookings.
    async fn owned_car(
        &self,
        actor: UserId,
        car_id: &CarId,
        action: &str,
    ) -> Result<(Car, Vec<Booking>), Error> {
        let host = require_verified_user(self.users.as_ref(), actor).await?;
        require_host(&host, action)?;
        let car = self
            .cars
            .find_by_id(car_id)
            .await
            .map_err(map_car_error)?
            .ok_or_else(|| Error::not_found("Car not found"))?;
        if !car.is_hosted_by(host.id()) {
            return Err(Error::forbidden(format!("You can only {action} your own cars")));
        }
        let bookings = self
            .bookings
            .list_for_car(car_id)
            .await
            .map_err(map_booking_error)?;
        Ok((car, bookings))
    }
}

#[async_trait]
impl<C, B, R, U> CarCommand for CarService<C, B, R, U>
where
    C: CarRepository,
    B: BookingRepository,
    R: ReviewRepository,
    U: UserRepository,
{
    async fn create_car(&self, request: CreateCarRequest) -> Result<CarPayload, Error> {
        let host = require_verified_user(self.users.as_ref(), request.actor).await?;
        require_host(&host, "list cars")?;
        let details = parse_details(request.details)?;

        let car = Car::list(host.id(), details, self.clock.utc());
        self.cars.create(&car).await.map_err(map_car_error)?;
        info!(car_id = %car.id, host_id = %host.id(), "car listed");
        Ok(CarPayload::from(car))
    }

    async fn update_car(&self, request: UpdateCarRequest) -> Result<CarPayload, Error> {
        let (car, bookings) = self
            .owned_car(request.actor, &request.car_id, "edit")
            .await?;
        let details = parse_details(request.details)?;
        if any_in(&bookings, &BookingStatus::EDIT_BLOCKING) {
            return Err(Error::active_booking_exists(
                "Cannot edit car with active bookings",
            ));
        }

        let updated = self
            .cars
            .update_details(&car.id, &details, self.clock.utc())
            .await
            .map_err(map_car_error)?
            .ok_or_else(|| Error::not_found("Car not found"))?;
        Ok(CarPayload::from(updated))
    }

    async fn remove_car(&self, request: RemoveCarRequest) -> Result<CarRemoval, Error> {
        let (car, bookings) = self
            .owned_car(request.actor, &request.car_id, "delete")
            .await?;
        if any_in(&bookings, &BookingStatus::NON_TERMINAL) {
            return Err(Error::active_booking_exists(
                "Cannot delete car with active bookings",
            ));
        }

        if any_in(&bookings, &[BookingStatus::Completed]) {
            self.cars
                .soft_delete(&car.id, self.clock.utc())
                .await
                .map_err(map_car_error)?;
            info!(car_id = %car.id, "car soft-deleted");
            return Ok(CarRemoval::SoftDeleted);
        }

        self.cars.delete(&car.id).await.map_err(map_car_error)?;
        info!(car_id = %car.id, "car deleted");
        Ok(CarRemoval::Deleted)
    }
}

#[async_trait]
impl<C, B, R, U> CarQuery for CarService<C, B, R, U>
where
    C: CarRepository,
    B: BookingRepository,
    R: ReviewRepository,
    U: UserRepository,
{
    async fn list_available(&self, request: ListCarsRequest) -> Result<Vec<CarPayload>, Error> {
        let location = request
            .location
            .map(|location| location.trim().to_owned())
            .filter(|location| !location.is_empty());
        let cars = self
            .cars
            .list_available(location)
            .await
            .map_err(map_car_error)?;
        Ok(cars.into_iter().map(CarPayload::from).collect())
    }

    async fn get_car(&self, request: GetCarRequest) -> Result<CarDetailsResponse, Error> {
        let car = self
            .cars
            .find_by_id(&request.car_id)
            .await
            .map_err(map_car_error)?
            .ok_or_else(|| Error::not_found("Car not found"))?;
        let reviews = self
            .reviews
            .list_for_car(&car.id)
            .await
            .map_err(map_review_error)?;
        Ok(CarDetailsResponse {
            car: CarPayload::from(car),
            reviews: review_payloads(self.users.as_ref(), reviews).await?,
        })
    }

    async fn list_my_cars(&self, request: ListMyCarsRequest) -> Result<Vec<CarPayload>, Error> {
        let host = require_verified_user(self.users.as_ref(), request.actor).await?;
        require_host(&host, "manage cars")?;
        let cars = self
            .cars
            .list_by_host(&host.id())
            .await
            .map_err(map_car_error)?;
        Ok(cars.into_iter().map(CarPayload::from).collect())
    }
}

#[cfg(test)]
#[path = "car_service_tests.rs"]
mod tests;
