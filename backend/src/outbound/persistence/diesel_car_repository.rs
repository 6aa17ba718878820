//! PostgreSQL-backed `CarRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CarRepository, CarRepositoryError};
use crate::domain::{Car, CarDetails, CarDetailsDraft, CarId, RatingSummary, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CarDetailsChangeset, CarRow, NewCarRow};
use super::pool::{DbPool, PoolError};
use super::schema::cars;

/// Diesel-backed implementation of the car repository port.
#[derive(Clone)]
pub struct DieselCarRepository {
    pool: DbPool,
}

impl DieselCarRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CarRepositoryError {
    map_basic_pool_error(error, CarRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CarRepositoryError {
    map_basic_diesel_error(error, CarRepositoryError::query, CarRepositoryError::connection)
}

/// Convert a database row into a validated domain car.
fn row_to_car(row: CarRow) -> Result<Car, CarRepositoryError> {
    let CarRow {
        id,
        host_id,
        make,
        model,
        year,
        color,
        price_per_day,
        description,
        image_url,
        location,
        features,
        is_available,
        average_rating,
        total_reviews,
        created_at,
        updated_at,
        deleted_at,
    } = row;

    let details = CarDetails::new(CarDetailsDraft {
        make,
        model,
        year,
        color,
        price_per_day,
        description,
        image_url,
        location,
        features,
    })
    .map_err(|err| CarRepositoryError::query(format!("stored car details: {err}")))?;
    let total_reviews = u32::try_from(total_reviews)
        .map_err(|_| CarRepositoryError::query("stored review count is negative"))?;

    Ok(Car {
        id: CarId::from_uuid(id),
        host_id: UserId::from_uuid(host_id),
        details,
        is_available,
        rating: RatingSummary {
            average_rating,
            total_reviews,
        },
        created_at,
        updated_at,
        deleted_at,
    })
}

fn details_changeset(details: &CarDetails, updated_at: DateTime<Utc>) -> CarDetailsChangeset<'_> {
    CarDetailsChangeset {
        make: details.make(),
        model: details.model(),
        year: details.year(),
        color: details.color(),
        price_per_day: details.price_per_day(),
        description: details.description(),
        image_url: details.image_url(),
        location: details.location(),
        features: details.features(),
        updated_at,
    }
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn rows_to_cars(rows: Vec<CarRow>) -> Result<Vec<Car>, CarRepositoryError> {
    rows.into_iter().map(row_to_car).collect()
}

#[async_trait]
impl CarRepository for DieselCarRepository {
    async fn create(&self, car: &Car) -> Result<(), CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let details = &car.details;
        let total_reviews = i32::try_from(car.rating.total_reviews)
            .map_err(|_| CarRepositoryError::query("review count out of range"))?;
        let row = NewCarRow {
            id: *car.id.as_uuid(),
            host_id: *car.host_id.as_uuid(),
            make: details.make(),
            model: details.model(),
            year: details.year(),
            color: details.color(),
            price_per_day: details.price_per_day(),
            description: details.description(),
            image_url: details.image_url(),
            location: details.location(),
            features: details.features(),
            is_available: car.is_available,
            average_rating: car.rating.average_rating,
            total_reviews,
            created_at: car.created_at,
        };

        diesel::insert_into(cars::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &CarId) -> Result<Option<Car>, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = cars::table
            .filter(cars::id.eq(*id.as_uuid()))
            .select(CarRow::as_select())
            .first::<CarRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_car).transpose()
    }

    async fn list_available(
        &self,
        location: Option<String>,
    ) -> Result<Vec<Car>, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = cars::table
            .filter(cars::is_available.eq(true))
            .filter(cars::deleted_at.is_null())
            .order(cars::created_at.desc())
            .select(CarRow::as_select())
            .into_boxed();
        if let Some(needle) = location {
            query = query.filter(cars::location.ilike(contains_pattern(&needle)));
        }
        let rows = query
            .load::<CarRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_cars(rows)
    }

    async fn list_by_host(&self, host_id: &UserId) -> Result<Vec<Car>, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = cars::table
            .filter(cars::host_id.eq(*host_id.as_uuid()))
            .order(cars::created_at.desc())
            .select(CarRow::as_select())
            .load::<CarRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_cars(rows)
    }

    async fn update_details(
        &self,
        id: &CarId,
        details: &CarDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Car>, CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(cars::table.filter(cars::id.eq(*id.as_uuid())))
            .set(details_changeset(details, updated_at))
            .returning(CarRow::as_returning())
            .get_result::<CarRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_car).transpose()
    }

    async fn soft_delete(
        &self,
        id: &CarId,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(cars::table.filter(cars::id.eq(*id.as_uuid())))
            .set((
                cars::is_available.eq(false),
                cars::deleted_at.eq(Some(deleted_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &CarId) -> Result<(), CarRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Bookings and reviews go with the car through ON DELETE CASCADE.
        diesel::delete(cars::table.filter(cars::id.eq(*id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
