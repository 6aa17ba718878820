//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! A new review and the car's recomputed rating are written in one
//! transaction. The car row is locked first so two reviews of the same car
//! cannot each recompute from a set missing the other.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{
    BookingId, CarId, Rating, RatingSummary, Review, ReviewComment, ReviewId, UserId,
};

use super::diesel_basic_error_mapping::{
    invalid_row, map_basic_diesel_error, map_basic_pool_error, violated_unique_constraint,
};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::{cars, reviews};

const BOOKING_CONSTRAINT: &str = "reviews_booking_id_key";

/// Diesel-backed implementation of the review repository port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_basic_pool_error(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_basic_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewRepositoryError> {
    let rating = Rating::new(i64::from(row.rating))
        .map_err(|err| ReviewRepositoryError::query(format!("stored rating: {err}")))?;
    let comment = ReviewComment::new(row.comment)
        .map_err(|err| ReviewRepositoryError::query(format!("stored comment: {err}")))?;

    Ok(Review {
        id: ReviewId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        car_id: CarId::from_uuid(row.car_id),
        booking_id: BookingId::from_uuid(row.booking_id),
        rating,
        comment,
        created_at: row.created_at,
    })
}

fn summary_columns(summary: RatingSummary) -> (f64, i32) {
    (
        summary.average_rating,
        i32::try_from(summary.total_reviews).unwrap_or(i32::MAX),
    )
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert_and_recompute(
        &self,
        review: &Review,
    ) -> Result<RatingSummary, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReviewRow {
            id: *review.id.as_uuid(),
            user_id: *review.user_id.as_uuid(),
            car_id: *review.car_id.as_uuid(),
            booking_id: *review.booking_id.as_uuid(),
            rating: i16::from(review.rating.value()),
            comment: review.comment.as_ref(),
            created_at: review.created_at,
        };
        let car_id: Uuid = *review.car_id.as_uuid();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                cars::table
                    .filter(cars::id.eq(car_id))
                    .select(cars::id)
                    .for_update()
                    .first::<Uuid>(conn)
                    .await?;

                diesel::insert_into(reviews::table)
                    .values(&row)
                    .execute(conn)
                    .await?;

                let stored: Vec<i16> = reviews::table
                    .filter(reviews::car_id.eq(car_id))
                    .select(reviews::rating)
                    .load(conn)
                    .await?;
                let ratings = stored
                    .into_iter()
                    .map(|value| Rating::new(i64::from(value)))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(invalid_row)?;
                let summary = RatingSummary::from_ratings(&ratings);

                let (average_rating, total_reviews) = summary_columns(summary);
                diesel::update(cars::table.filter(cars::id.eq(car_id)))
                    .set((
                        cars::average_rating.eq(average_rating),
                        cars::total_reviews.eq(total_reviews),
                    ))
                    .execute(conn)
                    .await?;
                Ok(summary)
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| {
            if violated_unique_constraint(&error) == Some(BOOKING_CONSTRAINT) {
                ReviewRepositoryError::duplicate_review(review.booking_id)
            } else {
                map_diesel_error(error)
            }
        })
    }

    async fn find_by_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reviews::table
            .filter(reviews::booking_id.eq(*booking_id.as_uuid()))
            .select(ReviewRow::as_select())
            .first::<ReviewRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_review).transpose()
    }

    async fn list_for_car(&self, car_id: &CarId) -> Result<Vec<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = reviews::table
            .filter(reviews::car_id.eq(*car_id.as_uuid()))
            .order(reviews::created_at.desc())
            .select(ReviewRow::as_select())
            .load::<ReviewRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_review).collect()
    }
}
