//! Port for group persistence.

use async_trait::async_trait;

use crate::domain::{Group, GroupDraft, GroupId, GroupSlug};

use super::define_port_error;

define_port_error! {
    /// Errors raised by group repository adapters.
    pub enum GroupRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "group repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "group repository query failed: {message}",
        /// Another group already uses the slug.
        DuplicateSlug { slug: String } =>
            "group slug {slug} is already taken",
    }
}

/// Port for reading and administering groups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Create a group; the slug must be unused.
    async fn create(&self, draft: &GroupDraft) -> Result<Group, GroupRepositoryError>;

    /// Find a group by slug.
    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, GroupRepositoryError>;

    /// Find a group by identifier.
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, GroupRepositoryError>;

    /// Every group, ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, GroupRepositoryError>;

    /// Delete a group, detaching its posts. Returns whether it existed.
    async fn delete(&self, slug: &GroupSlug) -> Result<bool, GroupRepositoryError>;
}
