//! In-process adapters for every marketplace repository port.
//!
//! One [`InMemoryMarketplace`] holds users, cars, bookings and reviews behind
//! a single lock. Each port operation takes the lock once, so the booking
//! conflict scan and the insert that follows it are atomic with respect to
//! every other request. Used when no database is configured and by the
//! integration tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, CarRepository, CarRepositoryError, NewUserRecord,
    ReviewRepository, ReviewRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Booking, BookingId, BookingStatus, Car, CarDetails, CarId, EmailAddress, PasswordHash,
    PasswordResetGrant, Rating, RatingSummary, ResetCode, Review, ReviewId, User, UserId,
    UserUpdate, VerificationToken, conflicting_bookings,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
    verification_token: Option<VerificationToken>,
    reset_grant: Option<PasswordResetGrant>,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, StoredUser>,
    cars: HashMap<CarId, Car>,
    bookings: HashMap<BookingId, Booking>,
    reviews: HashMap<ReviewId, Review>,
}

impl Tables {
    fn user_by_email(&self, email: &EmailAddress) -> Option<&StoredUser> {
        self.users
            .values()
            .find(|stored| stored.user.email() == email)
    }

    fn bookings_where(&self, predicate: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .values()
            .filter(|booking| predicate(booking))
            .cloned()
            .collect();
        bookings.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        bookings
    }
}

/// Shared in-memory store implementing the repository ports.
#[derive(Debug, Default)]
pub struct InMemoryMarketplace {
    tables: Mutex<Tables>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryMarketplace {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, String> {
        self.tables.lock().map_err(|_| POISONED.to_owned())
    }

    /// Outstanding verification token for an address, if any.
    ///
    /// Stands in for reading the verification email in tests.
    pub fn verification_token_for(&self, email: &EmailAddress) -> Option<VerificationToken> {
        self.lock()
            .ok()?
            .user_by_email(email)
            .and_then(|stored| stored.verification_token.clone())
    }

    /// Outstanding password reset code for an address, if any.
    ///
    /// Stands in for reading the reset email in tests.
    pub fn reset_code_for(&self, email: &EmailAddress) -> Option<ResetCode> {
        self.lock()
            .ok()?
            .user_by_email(email)
            .and_then(|stored| stored.reset_grant.as_ref())
            .map(|grant| grant.code.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryMarketplace {
    async fn create(&self, record: &NewUserRecord) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        if tables.user_by_email(record.user.email()).is_some() {
            return Err(UserPersistenceError::duplicate_email(
                record.user.email().to_string(),
            ));
        }
        tables.users.insert(
            record.user.id(),
            StoredUser {
                user: record.user.clone(),
                password_hash: record.password_hash.clone(),
                verification_token: Some(record.verification_token.clone()),
                reset_grant: None,
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables.user_by_email(email).map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables
            .user_by_email(email)
            .map(|stored| (stored.user.clone(), stored.password_hash.clone())))
    }

    async fn find_by_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.verification_token.as_ref() == Some(token))
            .map(|stored| stored.user.clone()))
    }

    async fn replace_verification_token(
        &self,
        id: &UserId,
        token: &VerificationToken,
    ) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        if let Some(stored) = tables.users.get_mut(id) {
            stored.verification_token = Some(token.clone());
        }
        Ok(())
    }

    async fn mark_verified(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables.users.get_mut(id).map(|stored| {
            stored.user = stored.user.apply(&UserUpdate {
                verified: Some(true),
                ..UserUpdate::default()
            });
            stored.verification_token = None;
            stored.user.clone()
        }))
    }

    async fn update(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables.users.get_mut(id).map(|stored| {
            stored.user = stored.user.apply(update);
            stored.user.clone()
        }))
    }

    async fn store_reset_grant(
        &self,
        id: &UserId,
        grant: &PasswordResetGrant,
    ) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        if let Some(stored) = tables.users.get_mut(id) {
            stored.reset_grant = Some(grant.clone());
        }
        Ok(())
    }

    async fn find_reset_grant(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordResetGrant>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::query)?;
        Ok(tables
            .users
            .get(id)
            .and_then(|stored| stored.reset_grant.clone()))
    }

    async fn replace_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::query)?;
        if let Some(stored) = tables.users.get_mut(id) {
            stored.password_hash = password_hash.clone();
            stored.reset_grant = None;
        }
        Ok(())
    }
}

#[async_trait]
impl CarRepository for InMemoryMarketplace {
    async fn create(&self, car: &Car) -> Result<(), CarRepositoryError> {
        let mut tables = self.lock().map_err(CarRepositoryError::query)?;
        tables.cars.insert(car.id, car.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CarId) -> Result<Option<Car>, CarRepositoryError> {
        let tables = self.lock().map_err(CarRepositoryError::query)?;
        Ok(tables.cars.get(id).cloned())
    }

    async fn list_available(
        &self,
        location: Option<String>,
    ) -> Result<Vec<Car>, CarRepositoryError> {
        let needle = location.map(|location| location.to_lowercase());
        let tables = self.lock().map_err(CarRepositoryError::query)?;
        let mut cars: Vec<Car> = tables
            .cars
            .values()
            .filter(|car| car.is_bookable())
            .filter(|car| {
                needle.as_deref().is_none_or(|needle| {
                    car.details.location().to_lowercase().contains(needle)
                })
            })
            .cloned()
            .collect();
        cars.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(cars)
    }

    async fn list_by_host(&self, host_id: &UserId) -> Result<Vec<Car>, CarRepositoryError> {
        let tables = self.lock().map_err(CarRepositoryError::query)?;
        let mut cars: Vec<Car> = tables
            .cars
            .values()
            .filter(|car| car.host_id == *host_id)
            .cloned()
            .collect();
        cars.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(cars)
    }

    async fn update_details(
        &self,
        id: &CarId,
        details: &CarDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Car>, CarRepositoryError> {
        let mut tables = self.lock().map_err(CarRepositoryError::query)?;
        Ok(tables.cars.get_mut(id).map(|car| {
            car.details = details.clone();
            car.updated_at = Some(updated_at);
            car.clone()
        }))
    }

    async fn soft_delete(
        &self,
        id: &CarId,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), CarRepositoryError> {
        let mut tables = self.lock().map_err(CarRepositoryError::query)?;
        if let Some(car) = tables.cars.get_mut(id) {
            car.is_available = false;
            car.deleted_at = Some(deleted_at);
        }
        Ok(())
    }

    async fn delete(&self, id: &CarId) -> Result<(), CarRepositoryError> {
        let mut tables = self.lock().map_err(CarRepositoryError::query)?;
        tables.cars.remove(id);
        tables.bookings.retain(|_, booking| booking.car_id != *id);
        tables.reviews.retain(|_, review| review.car_id != *id);
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for InMemoryMarketplace {
    async fn insert_if_available(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut tables = self.lock().map_err(BookingRepositoryError::query)?;
        let bookable = tables
            .cars
            .get(&booking.car_id)
            .is_some_and(Car::is_bookable);
        if !bookable {
            return Err(BookingRepositoryError::car_unavailable(booking.car_id));
        }

        let conflicts = conflicting_bookings(
            &booking.period,
            tables
                .bookings
                .values()
                .filter(|existing| existing.car_id == booking.car_id),
        );
        if !conflicts.is_empty() {
            return Err(BookingRepositoryError::conflict(conflicts));
        }

        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let tables = self.lock().map_err(BookingRepositoryError::query)?;
        Ok(tables.bookings.get(id).cloned())
    }

    async fn list_for_car(&self, car_id: &CarId) -> Result<Vec<Booking>, BookingRepositoryError> {
        let tables = self.lock().map_err(BookingRepositoryError::query)?;
        Ok(tables.bookings_where(|booking| booking.car_id == *car_id))
    }

    async fn list_for_renter(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let tables = self.lock().map_err(BookingRepositoryError::query)?;
        Ok(tables.bookings_where(|booking| booking.user_id == *user_id))
    }

    async fn list_for_host(
        &self,
        host_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let tables = self.lock().map_err(BookingRepositoryError::query)?;
        Ok(tables.bookings_where(|booking| booking.host_id == *host_id))
    }

    async fn transition_status(
        &self,
        id: &BookingId,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<bool, BookingRepositoryError> {
        let mut tables = self.lock().map_err(BookingRepositoryError::query)?;
        match tables.bookings.get_mut(id) {
            Some(booking) if booking.status == expected => {
                booking.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ReviewRepository for InMemoryMarketplace {
    async fn insert_and_recompute(
        &self,
        review: &Review,
    ) -> Result<RatingSummary, ReviewRepositoryError> {
        let mut tables = self.lock().map_err(ReviewRepositoryError::query)?;
        if tables
            .reviews
            .values()
            .any(|existing| existing.booking_id == review.booking_id)
        {
            return Err(ReviewRepositoryError::duplicate_review(review.booking_id));
        }
        tables.reviews.insert(review.id, review.clone());

        let ratings: Vec<Rating> = tables
            .reviews
            .values()
            .filter(|existing| existing.car_id == review.car_id)
            .map(|existing| existing.rating)
            .collect();
        let summary = RatingSummary::from_ratings(&ratings);
        if let Some(car) = tables.cars.get_mut(&review.car_id) {
            car.rating = summary;
        }
        Ok(summary)
    }

    async fn find_by_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let tables = self.lock().map_err(ReviewRepositoryError::query)?;
        Ok(tables
            .reviews
            .values()
            .find(|review| review.booking_id == *booking_id)
            .cloned())
    }

    async fn list_for_car(&self, car_id: &CarId) -> Result<Vec<Review>, ReviewRepositoryError> {
        let tables = self.lock().map_err(ReviewRepositoryError::query)?;
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|review| review.car_id == *car_id)
            .cloned()
            .collect();
        reviews.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(reviews)
    }
}
