//! Driving port for reading posts: paginated listings, detail pages and
//! the data needed to render post forms.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::forms::GroupChoice;
use crate::domain::{Actor, Comment, Error, Group, GroupSlug, Post, PostId, User, Username};

/// Which listing a reader asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostListing {
    /// Every post.
    All,
    /// Posts in the group with this slug.
    Group(GroupSlug),
    /// Posts by the user with this username.
    Author(Username),
}

/// Request for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPostsRequest {
    /// Listing to page through.
    pub listing: PostListing,
    /// Requested page.
    pub page: PageRequest,
}

/// The entity a listing is scoped to, resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSubject {
    /// The site-wide index.
    Index,
    /// A group page.
    Group(Group),
    /// An author profile.
    Author(User),
}

/// One page of posts plus the resolved listing subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPostsResponse {
    /// What the listing is about.
    pub subject: ListingSubject,
    /// The page of posts, newest first.
    pub page: Page<Post>,
}

/// Everything shown on a post's own page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    /// The post.
    pub post: Post,
    /// Its comments, newest first.
    pub comments: Vec<Comment>,
    /// How many posts the author has published.
    pub author_posts_count: u64,
}

/// Domain use-case port for reading posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostListingQuery: Send + Sync {
    /// Load one page of a listing.
    ///
    /// Unknown group slugs and usernames fail with `not_found`.
    async fn list_posts(&self, request: ListPostsRequest) -> Result<ListPostsResponse, Error>;

    /// Load a post with its comments.
    async fn post_detail(&self, post_id: PostId) -> Result<PostDetail, Error>;

    /// Groups offered by the post form.
    async fn group_choices(&self) -> Result<Vec<GroupChoice>, Error>;

    /// Load a post for editing.
    ///
    /// Fails with `not_found` for a missing post and `forbidden` when the
    /// actor is not its author.
    async fn post_for_edit(&self, actor: &Actor, post_id: PostId) -> Result<Post, Error>;
}
