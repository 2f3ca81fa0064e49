//! Port for post persistence and filtered listings.
//!
//! Listings are ordered newest first by publication timestamp, with ties
//! broken by descending identifier so repeated reads agree.

use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostChanges, PostFilter, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "post repository query failed: {message}",
    }
}

/// Port for reading and writing posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and return it with author and group resolved.
    async fn insert(&self, post: &NewPost) -> Result<Post, PostRepositoryError>;

    /// Overwrite the mutable fields of a post. Returns `None` when absent.
    async fn update(
        &self,
        id: PostId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, PostRepositoryError>;

    /// Find a post by identifier.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Count posts matching the filter.
    async fn count(&self, filter: PostFilter) -> Result<u64, PostRepositoryError>;

    /// Load one window of posts matching the filter, newest first.
    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, PostRepositoryError>;
}
