//! Driving port for creating and editing posts and comments.

use async_trait::async_trait;

use crate::domain::forms::{CommentFormInput, PostFormInput};
use crate::domain::{Actor, Comment, Error, Post, PostId};

/// Request to publish a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    /// Author of the new post.
    pub actor: Actor,
    /// Raw form submission.
    pub form: PostFormInput,
}

/// Request to edit an existing post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPostRequest {
    /// User attempting the edit.
    pub actor: Actor,
    /// Post to edit.
    pub post_id: PostId,
    /// Raw form submission.
    pub form: PostFormInput,
}

/// Request to comment on a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentRequest {
    /// Comment author.
    pub actor: Actor,
    /// Post being commented on.
    pub post_id: PostId,
    /// Raw form submission.
    pub form: CommentFormInput,
}

/// Domain use-case port for post and comment mutations.
///
/// Validation failures return `invalid_request` errors whose details carry
/// per-field messages (see [`FieldErrors::from_error`]).
///
/// [`FieldErrors::from_error`]: crate::domain::forms::FieldErrors::from_error
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Publish a post authored by the actor.
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error>;

    /// Overwrite a post's text, group and image. Author only.
    async fn edit_post(&self, request: EditPostRequest) -> Result<Post, Error>;

    /// Add a comment to a post.
    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Error>;
}
