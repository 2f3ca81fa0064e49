//! PostgreSQL-backed `CommentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, NewComment, PostId};

use super::diesel_basic_error_mapping::{
    DieselFailure, classify, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{CommentRow, NewCommentRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_conversion::comment_from_rows;
use super::schema::{comments, users};

/// Diesel implementation of the comment repository port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a repository over the pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentRepositoryError {
    map_basic_pool_error(error, CommentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CommentRepositoryError {
    map_basic_diesel_error(
        error,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
    )
}

fn to_comment((row, author): (CommentRow, UserRow)) -> Result<Comment, CommentRepositoryError> {
    comment_from_rows(row, author).map_err(CommentRepositoryError::query)
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCommentRow {
            post_id: comment.post_id.get(),
            author_id: *comment.author_id.as_uuid(),
            text: comment.text.as_str(),
            created: comment.created,
        };
        let inserted = diesel::insert_into(comments::table)
            .values(&row)
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify(&err) {
                DieselFailure::ForeignKeyViolation => {
                    CommentRepositoryError::post_not_found(comment.post_id.get())
                }
                _ => map_diesel_error(err),
            })?;
        let author = users::table
            .find(inserted.author_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_comment((inserted, author))
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(CommentRow, UserRow)> = comments::table
            .inner_join(users::table)
            .filter(comments::post_id.eq(post_id.get()))
            .order((comments::created.desc(), comments::id.desc()))
            .select((CommentRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_comment).collect()
    }
}
