//! PostgreSQL-backed booking ledger.
//!
//! `insert_if_available` runs in one transaction that first takes a row lock
//! on the car (`SELECT ... FOR UPDATE`). Every booking attempt for the same
//! car queues on that lock, so the overlap query and the insert that follows
//! it see a ledger no concurrent attempt can change underneath them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{Booking, BookingId, BookingStatus, BookingTerms, CarId, DateRange, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{BookingRow, NewBookingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, cars};

/// Diesel-backed implementation of the booking ledger port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    map_basic_pool_error(error, BookingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    map_basic_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

/// What the guarded insert decided.
#[derive(Debug)]
enum InsertOutcome {
    Inserted,
    CarUnavailable,
    Conflict(Vec<Uuid>),
}

impl InsertOutcome {
    fn into_result(self, car_id: CarId) -> Result<(), BookingRepositoryError> {
        match self {
            Self::Inserted => Ok(()),
            Self::CarUnavailable => Err(BookingRepositoryError::car_unavailable(car_id)),
            Self::Conflict(ids) => Err(BookingRepositoryError::conflict(
                ids.into_iter()
                    .map(BookingId::from_uuid)
                    .collect::<Vec<_>>(),
            )),
        }
    }
}

fn non_terminal_statuses() -> [&'static str; 3] {
    BookingStatus::NON_TERMINAL.map(BookingStatus::as_str)
}

/// Convert a database row into a validated domain booking.
fn row_to_booking(row: BookingRow) -> Result<Booking, BookingRepositoryError> {
    let BookingRow {
        id,
        user_id,
        car_id,
        host_id,
        start_date,
        end_date,
        total_amount,
        driver_license,
        additional_notes,
        status,
        created_at,
    } = row;

    let period = DateRange::new(start_date, end_date)
        .map_err(|err| BookingRepositoryError::query(format!("stored period: {err}")))?;
    let terms = BookingTerms::new(total_amount, driver_license, additional_notes)
        .map_err(|err| BookingRepositoryError::query(format!("stored terms: {err}")))?;
    let status = status
        .parse()
        .map_err(|err| BookingRepositoryError::query(format!("stored status: {err}")))?;

    Ok(Booking {
        id: BookingId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        car_id: CarId::from_uuid(car_id),
        host_id: UserId::from_uuid(host_id),
        period,
        terms,
        status,
        created_at,
    })
}

fn rows_to_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, BookingRepositoryError> {
    rows.into_iter().map(row_to_booking).collect()
}

fn new_row(booking: &Booking) -> NewBookingRow<'_> {
    NewBookingRow {
        id: *booking.id.as_uuid(),
        user_id: *booking.user_id.as_uuid(),
        car_id: *booking.car_id.as_uuid(),
        host_id: *booking.host_id.as_uuid(),
        start_date: booking.period.start(),
        end_date: booking.period.end(),
        total_amount: booking.terms.total_amount(),
        driver_license: booking.terms.driver_license(),
        additional_notes: booking.terms.additional_notes(),
        status: booking.status.as_str(),
        created_at: booking.created_at,
    }
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert_if_available(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = new_row(booking);
        let car_id = *booking.car_id.as_uuid();
        let start = booking.period.start();
        let end = booking.period.end();

        let outcome = conn
            .transaction(|conn| {
                async move {
                    let car = cars::table
                        .filter(cars::id.eq(car_id))
                        .select((cars::is_available, cars::deleted_at))
                        .for_update()
                        .first::<(bool, Option<DateTime<Utc>>)>(conn)
                        .await
                        .optional()?;
                    let bookable = matches!(car, Some((true, None)));
                    if !bookable {
                        return Ok(InsertOutcome::CarUnavailable);
                    }

                    // Closed-interval overlap against every calendar-blocking booking.
                    let conflicts: Vec<Uuid> = bookings::table
                        .filter(bookings::car_id.eq(car_id))
                        .filter(bookings::status.eq_any(non_terminal_statuses()))
                        .filter(bookings::start_date.le(end))
                        .filter(bookings::end_date.ge(start))
                        .order(bookings::start_date.asc())
                        .select(bookings::id)
                        .load(conn)
                        .await?;
                    if !conflicts.is_empty() {
                        return Ok(InsertOutcome::Conflict(conflicts));
                    }

                    diesel::insert_into(bookings::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(InsertOutcome::Inserted)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        outcome.into_result(booking.car_id)
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = bookings::table
            .filter(bookings::id.eq(*id.as_uuid()))
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_booking).transpose()
    }

    async fn list_for_car(&self, car_id: &CarId) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = bookings::table
            .filter(bookings::car_id.eq(*car_id.as_uuid()))
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load::<BookingRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_bookings(rows)
    }

    async fn list_for_renter(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = bookings::table
            .filter(bookings::user_id.eq(*user_id.as_uuid()))
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load::<BookingRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_bookings(rows)
    }

    async fn list_for_host(
        &self,
        host_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = bookings::table
            .filter(bookings::host_id.eq(*host_id.as_uuid()))
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load::<BookingRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_bookings(rows)
    }

    async fn transition_status(
        &self,
        id: &BookingId,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            bookings::table
                .filter(bookings::id.eq(*id.as_uuid()))
                .filter(bookings::status.eq(expected.as_str())),
        )
        .set(bookings::status.eq(next.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }
}
