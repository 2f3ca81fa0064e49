//! Mapping from driven-port errors to domain errors.
//!
//! Connection failures surface as `service_unavailable`; anything else the
//! adapter reports is an `internal` error whose message is redacted by the
//! HTTP layer.

use super::Error;
use super::ports::{
    CommentRepositoryError, GroupRepositoryError, ImageStoreError, PasswordHasherError,
    PostRepositoryError, UserRepositoryError,
};

pub(crate) fn map_post_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("post repository unavailable: {message}"))
        }
        PostRepositoryError::Query { message } => {
            Error::internal(format!("post repository error: {message}"))
        }
    }
}

pub(crate) fn map_group_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupRepositoryError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupRepositoryError::DuplicateSlug { slug } => {
            Error::conflict(format!("group slug {slug} is already taken"))
        }
    }
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} is already taken"))
        }
    }
}

pub(crate) fn map_comment_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentRepositoryError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
        CommentRepositoryError::PostNotFound { post_id } => {
            Error::not_found(format!("post {post_id} not found"))
        }
    }
}

pub(crate) fn map_image_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Io { message } => Error::internal(format!("image store error: {message}")),
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    match error {
        PasswordHasherError::Hash { message } => {
            Error::internal(format!("password hashing failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(map_post_error(PostRepositoryError::connection("down")), ErrorCode::ServiceUnavailable)]
    #[case(map_post_error(PostRepositoryError::query("bad")), ErrorCode::InternalError)]
    #[case(map_group_error(GroupRepositoryError::duplicate_slug("cats")), ErrorCode::Conflict)]
    #[case(map_user_error(UserRepositoryError::duplicate_username("leo")), ErrorCode::Conflict)]
    #[case(map_user_error(UserRepositoryError::connection("down")), ErrorCode::ServiceUnavailable)]
    #[case(map_comment_error(CommentRepositoryError::post_not_found(4_i64)), ErrorCode::NotFound)]
    #[case(map_image_error(ImageStoreError::io("disk full")), ErrorCode::InternalError)]
    #[case(map_hasher_error(PasswordHasherError::hash("oom")), ErrorCode::InternalError)]
    fn maps_port_errors(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }
}
