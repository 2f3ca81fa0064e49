//! Posts and the value types they are built from.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Group, GroupId, User, UserId};

/// Validation errors returned by post constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// The text was blank once trimmed.
    #[error("text must not be empty")]
    EmptyText,
    /// The image path was blank or not relative to the media root.
    #[error("image path must be a relative path under the media root")]
    InvalidImagePath,
}

/// Database identifier of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of a post. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct PostText(String);

impl PostText {
    /// Validate and wrap post text, stripping surrounding whitespace.
    pub fn new(text: impl Into<String>) -> Result<Self, PostValidationError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PostText> for String {
    fn from(value: PostText) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostText {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Path of a stored image, relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "posts/3b1f0c.png")]
pub struct ImageRef(String);

impl ImageRef {
    /// Validate a relative media path.
    pub fn new(path: impl Into<String>) -> Result<Self, PostValidationError> {
        let path = path.into();
        let escapes = path.split('/').any(|part| part.is_empty() || part == "..");
        if path.trim().is_empty() || path.starts_with('/') || escapes {
            return Err(PostValidationError::InvalidImagePath);
        }
        Ok(Self(path))
    }

    /// Borrow the relative path.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Row to insert for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Post body.
    pub text: PostText,
    /// Author; fixed for the post's lifetime.
    pub author_id: UserId,
    /// Optional group.
    pub group_id: Option<GroupId>,
    /// Optional stored image.
    pub image: Option<ImageRef>,
    /// Publication timestamp stamped by the service.
    pub pub_date: DateTime<Utc>,
}

/// Mutable fields overwritten by an edit.
///
/// Author and publication timestamp are absent on purpose: an edit cannot
/// express a change to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    /// Replacement body.
    pub text: PostText,
    /// Replacement group, `None` clears it.
    pub group_id: Option<GroupId>,
    /// Replacement image, `None` clears it.
    pub image: Option<ImageRef>,
}

/// Which posts a repository listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// Every post.
    All,
    /// Posts in one group.
    Group(GroupId),
    /// Posts by one author.
    Author(UserId),
}

/// A published post with its author and group resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Post {
    id: PostId,
    text: PostText,
    pub_date: DateTime<Utc>,
    author: User,
    group: Option<Group>,
    image: Option<ImageRef>,
}

/// Number of characters shown by [`Post`]'s `Display` implementation.
pub const POST_PREVIEW_CHARS: usize = 15;

impl Post {
    /// Assemble a post from stored parts.
    pub fn new(
        id: PostId,
        text: PostText,
        pub_date: DateTime<Utc>,
        author: User,
        group: Option<Group>,
        image: Option<ImageRef>,
    ) -> Self {
        Self {
            id,
            text,
            pub_date,
            author,
            group,
            image,
        }
    }

    /// Storage identifier.
    pub fn id(&self) -> PostId {
        self.id
    }

    /// Post body.
    pub fn text(&self) -> &PostText {
        &self.text
    }

    /// When the post was published.
    pub fn pub_date(&self) -> DateTime<Utc> {
        self.pub_date
    }

    /// Post author.
    pub fn author(&self) -> &User {
        &self.author
    }

    /// Group the post belongs to, if any.
    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    /// Attached image, if any.
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.as_str().chars().take(POST_PREVIEW_CHARS).collect();
        f.write_str(&preview)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Username;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn blank_text_is_rejected(#[case] raw: &str) {
        assert_eq!(PostText::new(raw), Err(PostValidationError::EmptyText));
    }

    #[rstest]
    #[case("hello", "hello")]
    #[case("  hello world \n", "hello world")]
    #[case("\tline one\nline two\t", "line one\nline two")]
    fn surrounding_whitespace_is_stripped(#[case] raw: &str, #[case] expected: &str) {
        let text = PostText::new(raw).expect("valid text");
        assert_eq!(text.as_str(), expected);
    }

    #[rstest]
    #[case("posts/abc.png", true)]
    #[case("abc.jpg", true)]
    #[case("", false)]
    #[case("/etc/passwd", false)]
    #[case("posts/../secret", false)]
    #[case("posts//abc.png", false)]
    fn image_paths_stay_under_media_root(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(ImageRef::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn display_shows_first_fifteen_characters() {
        let author = User::new(UserId::random(), Username::new("leo").expect("valid"));
        let post = Post::new(
            PostId::new(1),
            PostText::new("Привет, это очень длинный пост").expect("valid"),
            Utc::now(),
            author,
            None,
            None,
        );
        assert_eq!(post.to_string(), "Привет, это оче");
    }
}
