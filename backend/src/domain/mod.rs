//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed blog entities, the ports the services
//! depend on, and the services implementing the driving ports. Types here
//! never touch HTTP or SQL; adapters translate at the edges.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Username, Actor: identities and the acting principal.
//! - Group, Post, Comment: blog entities with their value types.
//! - forms: static form schemas and field validation.
//! - PostListingService, PostCommandService, PasswordLoginService,
//!   BlogAdminService: use-case implementations.

pub mod admin_service;
pub mod auth;
pub mod comment;
pub mod error;
pub mod forms;
pub mod group;
pub mod login_service;
pub mod ports;
pub mod post;
pub mod post_command_service;
pub mod post_listing_service;
mod repository_errors;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod user;

pub use self::admin_service::BlogAdminService;
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordHash};
pub use self::comment::{Comment, CommentId, CommentText, CommentValidationError, NewComment};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::group::{Group, GroupDraft, GroupId, GroupSlug, GroupValidationError};
pub use self::login_service::PasswordLoginService;
pub use self::post::{
    ImageRef, NewPost, Post, PostChanges, PostFilter, PostId, PostText, PostValidationError,
};
pub use self::post_command_service::PostCommandService;
pub use self::post_listing_service::PostListingService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Actor, User, UserId, UserValidationError, Username};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
