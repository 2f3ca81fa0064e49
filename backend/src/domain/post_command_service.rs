//! Post command service.
//!
//! Implements [`PostCommand`]. Publication and comment timestamps come from
//! the injected clock at the moment of persistence. Edits overwrite text,
//! group and image only; author and publication time are fixed at creation.
//! Concurrent edits to one post are last-write-wins.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::forms::{FieldErrors, ImageChange, INVALID_CHOICE_MESSAGE, ValidImage};
use super::ports::{
    CommentRepository, CreateCommentRequest, CreatePostRequest, EditPostRequest, GroupRepository,
    ImageStore, PostCommand, PostRepository,
};
use super::repository_errors::{
    map_comment_error, map_group_error, map_image_error, map_post_error,
};
use super::{
    Comment, Error, GroupId, ImageRef, NewComment, NewPost, Post, PostChanges, PostId,
};

const INVALID_POST_FORM: &str = "post form is invalid";
const INVALID_COMMENT_FORM: &str = "comment form is invalid";

/// Write-side service for posts and comments.
#[derive(Clone)]
pub struct PostCommandService<P, G, C, I> {
    posts: Arc<P>,
    groups: Arc<G>,
    comments: Arc<C>,
    images: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<P, G, C, I> PostCommandService<P, G, C, I> {
    /// Create a command service over the given ports.
    pub fn new(
        posts: Arc<P>,
        groups: Arc<G>,
        comments: Arc<C>,
        images: Arc<I>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            groups,
            comments,
            images,
            clock,
        }
    }
}

impl<P, G, C, I> PostCommandService<P, G, C, I>
where
    P: PostRepository,
    G: GroupRepository,
    C: CommentRepository,
    I: ImageStore,
{
    async fn ensure_group_exists(&self, group_id: Option<GroupId>) -> Result<(), Error> {
        let Some(group_id) = group_id else {
            return Ok(());
        };
        let group = self
            .groups
            .find_by_id(group_id)
            .await
            .map_err(map_group_error)?;
        if group.is_some() {
            return Ok(());
        }
        let mut errors = FieldErrors::new();
        errors.add("group", INVALID_CHOICE_MESSAGE);
        Err(errors.into_error(INVALID_POST_FORM))
    }

    async fn store_image(&self, image: &ValidImage) -> Result<ImageRef, Error> {
        self.images.store(image).await.map_err(map_image_error)
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
impl<P, G, C, I> PostCommand for PostCommandService<P, G, C, I>
where
    P: PostRepository,
    G: GroupRepository,
    C: CommentRepository,
    I: ImageStore,
{
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error> {
        let CreatePostRequest { actor, form } = request;
        let form = form
            .clean()
            .map_err(|errors| errors.into_error(INVALID_POST_FORM))?;
        self.ensure_group_exists(form.group_id).await?;

        let image = match form.image {
            ImageChange::Replace(image) => Some(self.store_image(&image).await?),
            ImageChange::Keep | ImageChange::Clear => None,
        };
        let new_post = NewPost {
            text: form.text,
            author_id: *actor.user_id(),
            group_id: form.group_id,
            image,
            pub_date: self.clock.utc(),
        };
        let post = self.posts.insert(&new_post).await.map_err(map_post_error)?;

        info!(post_id = %post.id(), author = %actor.username(), "post published");
        Ok(post)
    }

    async fn edit_post(&self, request: EditPostRequest) -> Result<Post, Error> {
        let EditPostRequest {
            actor,
            post_id,
            form,
        } = request;
        let existing = self.find_post(post_id).await?;
        if !actor.is(existing.author()) {
            warn!(%post_id, actor = %actor.username(), "edit rejected for non-author");
            return Err(Error::forbidden("only the author may edit this post"));
        }

        let form = form
            .clean()
            .map_err(|errors| errors.into_error(INVALID_POST_FORM))?;
        self.ensure_group_exists(form.group_id).await?;

        let image = match form.image {
            ImageChange::Keep => existing.image().cloned(),
            ImageChange::Clear => None,
            ImageChange::Replace(image) => Some(self.store_image(&image).await?),
        };
        let changes = PostChanges {
            text: form.text,
            group_id: form.group_id,
            image,
        };
        let post = self
            .posts
            .update(post_id, &changes)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found(format!("post {post_id} not found")))?;

        info!(%post_id, author = %actor.username(), "post edited");
        Ok(post)
    }

    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Error> {
        let CreateCommentRequest {
            actor,
            post_id,
            form,
        } = request;
        self.find_post(post_id).await?;
        let text = form
            .clean()
            .map_err(|errors| errors.into_error(INVALID_COMMENT_FORM))?;

        let comment = self
            .comments
            .insert(&NewComment {
                post_id,
                author_id: *actor.user_id(),
                text,
                created: self.clock.utc(),
            })
            .await
            .map_err(map_comment_error)?;

        info!(%post_id, comment_id = comment.id().get(), author = %actor.username(), "comment added");
        Ok(comment)
    }
}

#[cfg(test)]
#[path = "post_command_service_tests.rs"]
mod tests;
