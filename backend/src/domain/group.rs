//! Groups: named categories a post may optionally belong to.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by group constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupValidationError {
    /// The slug was blank.
    #[error("slug must not be empty")]
    EmptySlug,
    /// The slug exceeded [`GROUP_SLUG_MAX`].
    #[error("slug must be at most {max} characters")]
    SlugTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The slug contained characters outside `[A-Za-z0-9_-]`.
    #[error("slug may only contain letters, digits, hyphens and underscores")]
    SlugInvalidCharacters,
    /// The title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// The title exceeded [`GROUP_TITLE_MAX`].
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Database identifier of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for a group slug.
pub const GROUP_SLUG_MAX: usize = 50;
/// Maximum allowed length for a group title.
pub const GROUP_TITLE_MAX: usize = 200;

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_regex() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9_-]+$")
            .unwrap_or_else(|error| panic!("slug regex failed to compile: {error}"))
    })
}

/// URL-safe unique identifier of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "cats")]
pub struct GroupSlug(String);

impl GroupSlug {
    /// Validate and construct a slug.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::GroupSlug;
    ///
    /// assert!(GroupSlug::new("rust-news").is_ok());
    /// assert!(GroupSlug::new("Rust News").is_err());
    /// ```
    pub fn new(slug: impl Into<String>) -> Result<Self, GroupValidationError> {
        let slug = slug.into();
        if slug.is_empty() {
            return Err(GroupValidationError::EmptySlug);
        }
        if slug.chars().count() > GROUP_SLUG_MAX {
            return Err(GroupValidationError::SlugTooLong {
                max: GROUP_SLUG_MAX,
            });
        }
        if !slug_regex().is_match(&slug) {
            return Err(GroupValidationError::SlugInvalidCharacters);
        }
        Ok(Self(slug))
    }

    /// Borrow the slug.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GroupSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<GroupSlug> for String {
    fn from(value: GroupSlug) -> Self {
        value.0
    }
}

impl TryFrom<String> for GroupSlug {
    type Error = GroupValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Fields required to create a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDraft {
    slug: GroupSlug,
    title: String,
    description: String,
}

impl GroupDraft {
    /// Validate the title and assemble a draft.
    pub fn new(
        slug: GroupSlug,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, GroupValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(GroupValidationError::EmptyTitle);
        }
        if title.chars().count() > GROUP_TITLE_MAX {
            return Err(GroupValidationError::TitleTooLong {
                max: GROUP_TITLE_MAX,
            });
        }
        Ok(Self {
            slug,
            title,
            description: description.into(),
        })
    }

    /// Slug for the new group.
    pub fn slug(&self) -> &GroupSlug {
        &self.slug
    }

    /// Title for the new group.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A persisted group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Group {
    id: GroupId,
    slug: GroupSlug,
    title: String,
    description: String,
}

impl Group {
    /// Attach a storage identifier to a draft.
    pub fn from_draft(id: GroupId, draft: GroupDraft) -> Self {
        let GroupDraft {
            slug,
            title,
            description,
        } = draft;
        Self {
            id,
            slug,
            title,
            description,
        }
    }

    /// Storage identifier.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Unique slug.
    pub fn slug(&self) -> &GroupSlug {
        &self.slug
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
