//! PostgreSQL-backed `GroupRepository`.
//!
//! Deleting a group relies on the `ON DELETE SET NULL` foreign key to detach
//! its posts.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GroupRepository, GroupRepositoryError};
use crate::domain::{Group, GroupDraft, GroupId, GroupSlug};

use super::diesel_basic_error_mapping::{
    DieselFailure, classify, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{GroupRow, NewGroupRow};
use super::pool::{DbPool, PoolError};
use super::row_conversion::group_from_row;
use super::schema::groups;

/// Diesel implementation of the group repository port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a repository over the pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupRepositoryError {
    map_basic_pool_error(error, GroupRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GroupRepositoryError {
    map_basic_diesel_error(
        error,
        GroupRepositoryError::query,
        GroupRepositoryError::connection,
    )
}

fn to_group(row: GroupRow) -> Result<Group, GroupRepositoryError> {
    group_from_row(row).map_err(GroupRepositoryError::query)
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn create(&self, draft: &GroupDraft) -> Result<Group, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewGroupRow {
            slug: draft.slug().as_str(),
            title: draft.title(),
            description: draft.description(),
        };
        let inserted = diesel::insert_into(groups::table)
            .values(&row)
            .returning(GroupRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify(&err) {
                DieselFailure::UniqueViolation => {
                    GroupRepositoryError::duplicate_slug(draft.slug().as_str())
                }
                _ => map_diesel_error(err),
            })?;
        to_group(inserted)
    }

    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        groups::table
            .filter(groups::slug.eq(slug.as_str()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_group)
            .transpose()
    }

    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        groups::table
            .find(id.get())
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_group)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = groups::table
            .order((groups::title.asc(), groups::id.asc()))
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_group).collect()
    }

    async fn delete(&self, slug: &GroupSlug) -> Result<bool, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(groups::table.filter(groups::slug.eq(slug.as_str())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
