//! Port for reading and registering users.

use async_trait::async_trait;

use crate::domain::{PasswordHash, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } =>
            "username {username} is already taken",
    }
}

/// Data required to register a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: Username,
    /// Hashed password.
    pub password_hash: PasswordHash,
}

/// Port for user lookups and registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a new user.
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Find a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Find a user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Load a user together with the stored password hash.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, PasswordHash)>, UserRepositoryError>;
}
