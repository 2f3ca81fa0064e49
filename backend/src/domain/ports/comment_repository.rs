//! Port for comment persistence.

use async_trait::async_trait;

use crate::domain::{Comment, NewComment, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "comment repository query failed: {message}",
        /// The parent post does not exist.
        PostNotFound { post_id: i64 } =>
            "post {post_id} does not exist",
    }
}

/// Port for writing and reading comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment and return it with its author resolved.
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Comments on a post, newest first.
    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, CommentRepositoryError>;
}
