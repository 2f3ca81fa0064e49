//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NewUser, UserRepository, UserRepositoryError};
use crate::domain::{PasswordHash, User, UserId, Username};

use super::diesel_basic_error_mapping::{
    DieselFailure, classify, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{CredentialRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_conversion::user_from_row;
use super::schema::users;

/// Diesel implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    user_from_row(row).map_err(UserRepositoryError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: user.username.as_str(),
            password_hash: user.password_hash.as_str(),
        };
        let inserted = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify(&err) {
                DieselFailure::UniqueViolation => {
                    UserRepositoryError::duplicate_username(user.username.as_str())
                }
                _ => map_diesel_error(err),
            })?;
        to_user(inserted)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, PasswordHash)>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(CredentialRow {
            id,
            username,
            password_hash,
        }) = row
        else {
            return Ok(None);
        };
        let user = to_user(UserRow { id, username })?;
        Ok(Some((user, PasswordHash::new(password_hash))))
    }
}
