//! PostgreSQL-backed `PostRepository`.
//!
//! Posts are always loaded joined with their author and, when set, their
//! group. Listings order by `pub_date DESC, id DESC`, matching the
//! `posts_pub_date_idx` index.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{NewPost, Post, PostChanges, PostFilter, PostId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{GroupRow, NewPostRow, PostRow, PostUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_conversion::post_from_rows;
use super::schema::{groups, posts, users};

type PostWithRelations = (PostRow, UserRow, Option<GroupRow>);

/// Posts joined with their author and optional group, boxed so filters can
/// be added conditionally.
macro_rules! joined_posts {
    () => {
        posts::table
            .inner_join(users::table)
            .left_join(groups::table)
            .select((
                PostRow::as_select(),
                UserRow::as_select(),
                Option::<GroupRow>::as_select(),
            ))
            .into_boxed()
    };
}

/// Diesel implementation of the post repository port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a repository over the pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostRepositoryError {
    map_basic_pool_error(error, PostRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PostRepositoryError {
    map_basic_diesel_error(
        error,
        PostRepositoryError::query,
        PostRepositoryError::connection,
    )
}

fn to_post((row, author, group): PostWithRelations) -> Result<Post, PostRepositoryError> {
    post_from_rows(row, author, group).map_err(PostRepositoryError::query)
}

fn to_sql_bound(value: u64, name: &str) -> Result<i64, PostRepositoryError> {
    i64::try_from(value).map_err(|_| PostRepositoryError::query(format!("{name} out of range")))
}

async fn load_post(
    conn: &mut AsyncPgConnection,
    id: PostId,
) -> Result<Option<Post>, PostRepositoryError> {
    joined_posts!()
        .filter(posts::id.eq(id.get()))
        .first::<PostWithRelations>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(to_post)
        .transpose()
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, post: &NewPost) -> Result<Post, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPostRow {
            text: post.text.as_str(),
            pub_date: post.pub_date,
            author_id: *post.author_id.as_uuid(),
            group_id: post.group_id.map(|id| id.get()),
            image: post.image.as_ref().map(|image| image.as_str()),
        };
        let id: i64 = diesel::insert_into(posts::table)
            .values(&row)
            .returning(posts::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_post(&mut conn, PostId::new(id))
            .await?
            .ok_or_else(|| PostRepositoryError::query("inserted post vanished"))
    }

    async fn update(
        &self,
        id: PostId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = PostUpdate {
            text: changes.text.as_str(),
            group_id: changes.group_id.map(|group| group.get()),
            image: changes.image.as_ref().map(|image| image.as_str()),
        };
        let updated = diesel::update(posts::table.find(id.get()))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Ok(None);
        }
        load_post(&mut conn, id).await
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_post(&mut conn, id).await
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = posts::table.into_boxed();
        query = match filter {
            PostFilter::All => query,
            PostFilter::Group(group) => query.filter(posts::group_id.eq(group.get())),
            PostFilter::Author(author) => query.filter(posts::author_id.eq(*author.as_uuid())),
        };
        let count: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(count).map_err(|_| PostRepositoryError::query("negative post count"))
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let offset = to_sql_bound(offset, "offset")?;
        let limit = to_sql_bound(limit, "limit")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = joined_posts!()
            .order((posts::pub_date.desc(), posts::id.desc()))
            .offset(offset)
            .limit(limit);
        query = match filter {
            PostFilter::All => query,
            PostFilter::Group(group) => query.filter(posts::group_id.eq(group.get())),
            PostFilter::Author(author) => query.filter(posts::author_id.eq(*author.as_uuid())),
        };
        let rows: Vec<PostWithRelations> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(to_post).collect()
    }
}
