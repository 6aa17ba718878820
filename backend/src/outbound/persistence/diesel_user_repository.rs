//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are validated through the domain constructors on the way out, so a
//! malformed stored email or role surfaces as a query error instead of an
//! invalid `User`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NewUserRecord, UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, PasswordHash, PasswordResetGrant, PersonName, ResetCode, User, UserDraft,
    UserId, UserProfile, UserUpdate, VerificationToken,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_unique_constraint,
};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email: {err}")))?;
    let name = PersonName::new(row.name)
        .map_err(|err| UserPersistenceError::query(format!("stored name: {err}")))?;
    let role = row
        .role
        .parse()
        .map_err(|err| UserPersistenceError::query(format!("stored role: {err}")))?;

    Ok(User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        email,
        name,
        role,
        profile: UserProfile {
            phone: row.phone,
            address: row.address,
            date_of_birth: row.date_of_birth,
            bio: row.bio,
            profile_image: row.profile_image,
        },
        verified: row.is_verified,
        created_at: row.created_at,
    }))
}

/// A reset grant exists only when both its columns are populated.
fn row_reset_grant(row: &UserRow) -> Result<Option<PasswordResetGrant>, UserPersistenceError> {
    let (Some(code), Some(expires_at)) = (&row.password_reset_code, row.password_reset_expires_at)
    else {
        return Ok(None);
    };
    let code = ResetCode::new(code)
        .map_err(|err| UserPersistenceError::query(format!("stored reset code: {err}")))?;
    Ok(Some(PasswordResetGrant { code, expires_at }))
}

fn changeset(update: &UserUpdate) -> UserChangeset<'_> {
    let profile = update.profile.as_ref();
    UserChangeset {
        name: update.name.as_ref().map(<PersonName as AsRef<str>>::as_ref),
        role: update.role.map(|role| role.as_str()),
        phone: profile.map(|profile| profile.phone.as_deref()),
        address: profile.map(|profile| profile.address.as_deref()),
        date_of_birth: profile.map(|profile| profile.date_of_birth.as_deref()),
        bio: profile.map(|profile| profile.bio.as_deref()),
        profile_image: profile.map(|profile| profile.profile_image.as_deref()),
        is_verified: update.verified,
    }
}

impl DieselUserRepository {
    async fn find_row(
        &self,
        filter: users::BoxedQuery<'_, diesel::pg::Pg>,
    ) -> Result<Option<UserRow>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        filter
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &record.user;
        let profile = user.profile();
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: record.password_hash.as_ref(),
            name: user.name().as_ref(),
            role: user.role().as_str(),
            phone: profile.phone.as_deref(),
            address: profile.address.as_deref(),
            date_of_birth: profile.date_of_birth.as_deref(),
            bio: profile.bio.as_deref(),
            profile_image: profile.profile_image.as_deref(),
            is_verified: user.is_verified(),
            verification_token: Some(record.verification_token.as_ref()),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                if violated_unique_constraint(&error) == Some(EMAIL_CONSTRAINT) {
                    UserPersistenceError::duplicate_email(user.email().to_string())
                } else {
                    map_diesel_error(error)
                }
            })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.find_row(users::table.filter(users::id.eq(*id.as_uuid())).into_boxed())
            .await?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.find_row(users::table.filter(users::email.eq(email.as_ref())).into_boxed())
            .await?
            .map(row_to_user)
            .transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError> {
        let Some(row) = self
            .find_row(users::table.filter(users::email.eq(email.as_ref())).into_boxed())
            .await?
        else {
            return Ok(None);
        };
        let hash = PasswordHash::new(row.password_hash.clone());
        Ok(Some((row_to_user(row)?, hash)))
    }

    async fn find_by_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.find_row(
            users::table
                .filter(users::verification_token.eq(token.as_ref()))
                .into_boxed(),
        )
        .await?
        .map(row_to_user)
        .transpose()
    }

    async fn replace_verification_token(
        &self,
        id: &UserId,
        token: &VerificationToken,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(*id.as_uuid())))
            .set((
                users::verification_token.eq(token.as_ref()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn mark_verified(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.filter(users::id.eq(*id.as_uuid())))
            .set((
                users::is_verified.eq(true),
                users::verification_token.eq(None::<String>),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.filter(users::id.eq(*id.as_uuid())))
            .set((changeset(update), users::updated_at.eq(diesel::dsl::now)))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn store_reset_grant(
        &self,
        id: &UserId,
        grant: &PasswordResetGrant,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(*id.as_uuid())))
            .set((
                users::password_reset_code.eq(grant.code.as_ref()),
                users::password_reset_expires_at.eq(grant.expires_at),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_reset_grant(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordResetGrant>, UserPersistenceError> {
        let row = self
            .find_row(users::table.filter(users::id.eq(*id.as_uuid())).into_boxed())
            .await?;
        match row {
            Some(row) => row_reset_grant(&row),
            None => Ok(None),
        }
    }

    async fn replace_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(*id.as_uuid())))
            .set((
                users::password_hash.eq(password_hash.as_ref()),
                users::password_reset_code.eq(None::<String>),
                users::password_reset_expires_at.eq(None::<chrono::DateTime<chrono::Utc>>),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
