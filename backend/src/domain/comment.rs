//! Comments left on posts. Immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PostId, User, UserId};

/// Validation errors returned by comment constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    /// The text was blank once trimmed.
    #[error("text must not be empty")]
    EmptyText,
}

/// Database identifier of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CommentId(i64);

impl CommentId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Body of a comment. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct CommentText(String);

impl CommentText {
    /// Validate and wrap comment text, stripping surrounding whitespace.
    pub fn new(text: impl Into<String>) -> Result<Self, CommentValidationError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CommentValidationError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CommentText> for String {
    fn from(value: CommentText) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentText {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Row to insert for a new comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Parent post.
    pub post_id: PostId,
    /// Comment author.
    pub author_id: UserId,
    /// Comment body.
    pub text: CommentText,
    /// Creation timestamp stamped by the service.
    pub created: DateTime<Utc>,
}

/// A stored comment with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    id: CommentId,
    post_id: PostId,
    author: User,
    text: CommentText,
    created: DateTime<Utc>,
}

impl Comment {
    /// Assemble a comment from stored parts.
    pub fn new(
        id: CommentId,
        post_id: PostId,
        author: User,
        text: CommentText,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post_id,
            author,
            text,
            created,
        }
    }

    /// Storage identifier.
    pub fn id(&self) -> CommentId {
        self.id
    }

    /// Parent post.
    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    /// Comment author.
    pub fn author(&self) -> &User {
        &self.author
    }

    /// Comment body.
    pub fn text(&self) -> &CommentText {
        &self.text
    }

    /// When the comment was written.
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}
