//! Domain ports.
//!
//! Driven ports (`*Repository`, [`ImageStore`], [`PasswordHasher`]) are
//! implemented by outbound adapters. Driving ports ([`PostListingQuery`],
//! [`PostCommand`], [`LoginService`]) are implemented by domain services and
//! called by inbound adapters.

mod macros;

mod comment_repository;
mod group_repository;
mod image_store;
mod login_service;
mod password_hasher;
mod post_command;
mod post_listing_query;
mod post_repository;
mod user_repository;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupRepository, GroupRepositoryError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{FixtureImageStore, ImageStore, ImageStoreError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use post_command::MockPostCommand;
pub use post_command::{CreateCommentRequest, CreatePostRequest, EditPostRequest, PostCommand};
#[cfg(test)]
pub use post_listing_query::MockPostListingQuery;
pub use post_listing_query::{
    ListPostsRequest, ListPostsResponse, ListingSubject, PostDetail, PostListing,
    PostListingQuery,
};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUser, UserRepository, UserRepositoryError};
