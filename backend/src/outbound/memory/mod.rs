//! In-process blog store implementing every repository port.
//!
//! Used when no database URL is configured and by the behavioural tests.
//! Posts and comments store references to their author and group; reads
//! resolve them, mirroring the foreign keys of the PostgreSQL schema:
//! deleting a group leaves its posts without a group.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, GroupRepository, GroupRepositoryError, NewUser,
    PostRepository, PostRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Comment, CommentId, CommentText, Group, GroupDraft, GroupId, GroupSlug, ImageRef, NewComment,
    NewPost, PasswordHash, Post, PostChanges, PostFilter, PostId, PostText, User, UserId,
    Username,
};

#[derive(Debug, Clone)]
struct PostRecord {
    text: PostText,
    pub_date: DateTime<Utc>,
    author_id: UserId,
    group_id: Option<GroupId>,
    image: Option<ImageRef>,
}

impl PostRecord {
    fn matches(&self, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group) => self.group_id == Some(group),
            PostFilter::Author(author) => self.author_id == author,
        }
    }
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: CommentId,
    post_id: PostId,
    author_id: UserId,
    text: CommentText,
    created: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, (User, PasswordHash)>,
    groups: BTreeMap<GroupId, Group>,
    posts: BTreeMap<PostId, PostRecord>,
    comments: Vec<CommentRecord>,
    last_group_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

impl State {
    fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id).map(|(user, _)| user)
    }

    fn user_by_name(&self, username: &Username) -> Option<&(User, PasswordHash)> {
        self.users
            .values()
            .find(|(user, _)| user.username() == username)
    }

    fn group_by_slug(&self, slug: &GroupSlug) -> Option<&Group> {
        self.groups.values().find(|group| group.slug() == slug)
    }

    fn resolve_post(&self, id: PostId, record: &PostRecord) -> Result<Post, PostRepositoryError> {
        let author = self
            .user(&record.author_id)
            .cloned()
            .ok_or_else(|| PostRepositoryError::query(format!("post {id} has no author")))?;
        let group = record
            .group_id
            .and_then(|group_id| self.groups.get(&group_id).cloned());
        Ok(Post::new(
            id,
            record.text.clone(),
            record.pub_date,
            author,
            group,
            record.image.clone(),
        ))
    }

    fn resolve_comment(&self, record: &CommentRecord) -> Result<Comment, CommentRepositoryError> {
        let author = self.user(&record.author_id).cloned().ok_or_else(|| {
            CommentRepositoryError::query(format!("comment {} has no author", record.id.get()))
        })?;
        Ok(Comment::new(
            record.id,
            record.post_id,
            author,
            record.text.clone(),
            record.created,
        ))
    }
}

/// Mutex-guarded blog state implementing the user, group, post and comment
/// repositories.
#[derive(Debug, Default)]
pub struct InMemoryBlogStore {
    state: Mutex<State>,
}

impl InMemoryBlogStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

#[async_trait]
impl UserRepository for InMemoryBlogStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut state = self.lock();
        if state.user_by_name(&user.username).is_some() {
            return Err(UserRepositoryError::duplicate_username(
                user.username.as_str(),
            ));
        }
        let created = User::new(UserId::random(), user.username.clone());
        state.users.insert(
            *created.id(),
            (created.clone(), user.password_hash.clone()),
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().user(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .lock()
            .user_by_name(username)
            .map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, PasswordHash)>, UserRepositoryError> {
        Ok(self.lock().user_by_name(username).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryBlogStore {
    async fn create(&self, draft: &GroupDraft) -> Result<Group, GroupRepositoryError> {
        let mut state = self.lock();
        if state.group_by_slug(draft.slug()).is_some() {
            return Err(GroupRepositoryError::duplicate_slug(draft.slug().as_str()));
        }
        state.last_group_id += 1;
        let group = Group::from_draft(GroupId::new(state.last_group_id), draft.clone());
        state.groups.insert(group.id(), group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, GroupRepositoryError> {
        Ok(self.lock().group_by_slug(slug).cloned())
    }

    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        Ok(self.lock().groups.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, GroupRepositoryError> {
        let mut groups: Vec<Group> = self.lock().groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title().cmp(b.title()).then(a.id().cmp(&b.id())));
        Ok(groups)
    }

    async fn delete(&self, slug: &GroupSlug) -> Result<bool, GroupRepositoryError> {
        let mut state = self.lock();
        let Some(id) = state.group_by_slug(slug).map(Group::id) else {
            return Ok(false);
        };
        state.groups.remove(&id);
        for record in state.posts.values_mut() {
            if record.group_id == Some(id) {
                record.group_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn insert(&self, post: &NewPost) -> Result<Post, PostRepositoryError> {
        let mut state = self.lock();
        if state.user(&post.author_id).is_none() {
            return Err(PostRepositoryError::query("post author does not exist"));
        }
        if post
            .group_id
            .is_some_and(|group_id| !state.groups.contains_key(&group_id))
        {
            return Err(PostRepositoryError::query("post group does not exist"));
        }
        state.last_post_id += 1;
        let id = PostId::new(state.last_post_id);
        let record = PostRecord {
            text: post.text.clone(),
            pub_date: post.pub_date,
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image.clone(),
        };
        let resolved = state.resolve_post(id, &record)?;
        state.posts.insert(id, record);
        Ok(resolved)
    }

    async fn update(
        &self,
        id: PostId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, PostRepositoryError> {
        let mut state = self.lock();
        if changes
            .group_id
            .is_some_and(|group_id| !state.groups.contains_key(&group_id))
        {
            return Err(PostRepositoryError::query("post group does not exist"));
        }
        let Some(record) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        record.text = changes.text.clone();
        record.group_id = changes.group_id;
        record.image = changes.image.clone();
        let record = record.clone();
        state.resolve_post(id, &record).map(Some)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostRepositoryError> {
        let state = self.lock();
        state
            .posts
            .get(&id)
            .map(|record| state.resolve_post(id, record))
            .transpose()
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, PostRepositoryError> {
        let matching = self
            .lock()
            .posts
            .values()
            .filter(|record| record.matches(filter))
            .count();
        u64::try_from(matching).map_err(|err| PostRepositoryError::query(err.to_string()))
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let state = self.lock();
        let mut matching: Vec<(&PostId, &PostRecord)> = state
            .posts
            .iter()
            .filter(|(_, record)| record.matches(filter))
            .collect();
        matching.sort_by(|(a_id, a), (b_id, b)| {
            b.pub_date.cmp(&a.pub_date).then_with(|| b_id.cmp(a_id))
        });
        matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, record)| state.resolve_post(*id, record))
            .collect()
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut state = self.lock();
        if !state.posts.contains_key(&comment.post_id) {
            return Err(CommentRepositoryError::post_not_found(comment.post_id.get()));
        }
        state.last_comment_id += 1;
        let record = CommentRecord {
            id: CommentId::new(state.last_comment_id),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text.clone(),
            created: comment.created,
        };
        let resolved = state.resolve_comment(&record)?;
        state.comments.push(record);
        Ok(resolved)
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, CommentRepositoryError> {
        let state = self.lock();
        let mut records: Vec<&CommentRecord> = state
            .comments
            .iter()
            .filter(|record| record.post_id == post_id)
            .collect();
        records.sort_by(|a, b| {
            b.created
                .cmp(&a.created)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });
        records
            .into_iter()
            .map(|record| state.resolve_comment(record))
            .collect()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
