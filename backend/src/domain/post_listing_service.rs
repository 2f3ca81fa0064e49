//! Post listing service.
//!
//! Implements [`PostListingQuery`]: paginated listings of all posts, a
//! group's posts or an author's posts, plus post detail pages and the data
//! post forms need.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{DEFAULT_PER_PAGE, Paginator};
use tracing::{debug, warn};

use super::forms::GroupChoice;
use super::ports::{
    CommentRepository, GroupRepository, ListPostsRequest, ListPostsResponse, ListingSubject,
    PostDetail, PostListing, PostListingQuery, PostRepository, UserRepository,
};
use super::repository_errors::{
    map_comment_error, map_group_error, map_post_error, map_user_error,
};
use super::{Actor, Error, Post, PostFilter, PostId};

/// Read-side service over the post, group, user and comment repositories.
#[derive(Clone)]
pub struct PostListingService<P, G, U, C> {
    posts: Arc<P>,
    groups: Arc<G>,
    users: Arc<U>,
    comments: Arc<C>,
}

impl<P, G, U, C> PostListingService<P, G, U, C> {
    /// Create a listing service. Pages hold [`DEFAULT_PER_PAGE`] posts.
    pub const fn new(posts: Arc<P>, groups: Arc<G>, users: Arc<U>, comments: Arc<C>) -> Self {
        Self {
            posts,
            groups,
            users,
            comments,
        }
    }
}

impl<P, G, U, C> PostListingService<P, G, U, C>
where
    P: PostRepository,
    G: GroupRepository,
    U: UserRepository,
    C: CommentRepository,
{
    async fn resolve(&self, listing: PostListing) -> Result<(ListingSubject, PostFilter), Error> {
        match listing {
            PostListing::All => Ok((ListingSubject::Index, PostFilter::All)),
            PostListing::Group(slug) => {
                let group = self
                    .groups
                    .find_by_slug(&slug)
                    .await
                    .map_err(map_group_error)?
                    .ok_or_else(|| Error::not_found(format!("group {slug} not found")))?;
                let filter = PostFilter::Group(group.id());
                Ok((ListingSubject::Group(group), filter))
            }
            PostListing::Author(username) => {
                let author = self
                    .users
                    .find_by_username(&username)
                    .await
                    .map_err(map_user_error)?
                    .ok_or_else(|| Error::not_found(format!("user {username} not found")))?;
                let filter = PostFilter::Author(*author.id());
                Ok((ListingSubject::Author(author), filter))
            }
        }
    }

    async fn find_post(&self, post_id: PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found(format!("post {post_id} not found")))
    }
}

#[async_trait]
impl<P, G, U, C> PostListingQuery for PostListingService<P, G, U, C>
where
    P: PostRepository,
    G: GroupRepository,
    U: UserRepository,
    C: CommentRepository,
{
    async fn list_posts(&self, request: ListPostsRequest) -> Result<ListPostsResponse, Error> {
        let (subject, filter) = self.resolve(request.listing).await?;
        let count = self.posts.count(filter).await.map_err(map_post_error)?;
        let paginator = Paginator::new(count, DEFAULT_PER_PAGE)
            .map_err(|err| Error::internal(format!("invalid paginator: {err}")))?;
        let window = paginator.get_page(request.page);

        let items = if window.limit() == 0 {
            Vec::new()
        } else {
            self.posts
                .list(filter, window.offset(), window.limit())
                .await
                .map_err(map_post_error)?
        };
        debug!(
            ?filter,
            count,
            page = window.number(),
            returned = items.len(),
            "listed posts"
        );

        Ok(ListPostsResponse {
            subject,
            page: window.into_page(items),
        })
    }

    async fn post_detail(&self, post_id: PostId) -> Result<PostDetail, Error> {
        let post = self.find_post(post_id).await?;
        let comments = self
            .comments
            .list_for_post(post_id)
            .await
            .map_err(map_comment_error)?;
        let author_posts_count = self
            .posts
            .count(PostFilter::Author(*post.author().id()))
            .await
            .map_err(map_post_error)?;

        Ok(PostDetail {
            post,
            comments,
            author_posts_count,
        })
    }

    async fn group_choices(&self) -> Result<Vec<GroupChoice>, Error> {
        let groups = self.groups.list_all().await.map_err(map_group_error)?;
        Ok(groups
            .into_iter()
            .map(|group| GroupChoice {
                id: group.id(),
                title: group.title().to_owned(),
            })
            .collect())
    }

    async fn post_for_edit(&self, actor: &Actor, post_id: PostId) -> Result<Post, Error> {
        let post = self.find_post(post_id).await?;
        if !actor.is(post.author()) {
            warn!(%post_id, actor = %actor.username(), "edit form requested by non-author");
            return Err(Error::forbidden("only the author may edit this post"));
        }
        Ok(post)
    }
}

#[cfg(test)]
#[path = "post_listing_service_tests.rs"]
mod tests;
