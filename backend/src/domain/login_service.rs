//! Password-based `LoginService` over the user repository.
//!
//! Unknown usernames, malformed usernames and wrong passwords all fail with
//! the same `unauthorized` error so callers cannot probe which accounts
//! exist.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::ports::{LoginService, PasswordHasher, UserRepository};
use super::repository_errors::map_user_error;
use super::{Error, LoginCredentials, User, Username};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Authenticates users against stored password hashes.
#[derive(Clone)]
pub struct PasswordLoginService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> PasswordLoginService<U, H> {
    /// Create a login service from a user repository and password hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<U, H> LoginService for PasswordLoginService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some((user, hash)) = self
            .users
            .find_credentials(&username)
            .await
            .map_err(map_user_error)?
        else {
            debug!(%username, "login for unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify(credentials.password(), &hash) {
            debug!(%username, "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    //! Credential checks and repository failure mapping.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository, UserRepositoryError};
    use crate::domain::test_fixtures::user;
    use crate::domain::{ErrorCode, PasswordHash};

    fn credentials(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("valid test credentials")
    }

    fn service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
    ) -> PasswordLoginService<MockUserRepository, MockPasswordHasher> {
        PasswordLoginService::new(Arc::new(users), Arc::new(hasher))
    }

    #[tokio::test]
    async fn matching_password_returns_the_user() {
        let leo = user("leo");
        let stored = leo.clone();
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .return_once(move |_| Ok(Some((stored, PasswordHash::new("$argon2id$stub")))));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|password, hash| password == "s3cret" && hash.as_str() == "$argon2id$stub")
            .return_const(true);

        let authenticated = service(users, hasher)
            .authenticate(&credentials("leo", "s3cret"))
            .await
            .expect("login succeeds");

        assert_eq!(authenticated, leo);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .return_once(|_| Ok(Some((user("leo"), PasswordHash::new("$argon2id$stub")))));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().return_const(false);

        let error = service(users, hasher)
            .authenticate(&credentials("leo", "nope"))
            .await
            .expect_err("wrong password");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[case("ghost")]
    #[case("not a valid name")]
    #[tokio::test]
    async fn unknown_or_malformed_username_is_unauthorized(#[case] username: &str) {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().returning(|_| Ok(None));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().times(0);

        let error = service(users, hasher)
            .authenticate(&credentials(username, "whatever"))
            .await
            .expect_err("unknown user");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[case(UserRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserRepositoryError::query("broken"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_failures_are_mapped(
        #[case] failure: UserRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .return_once(move |_| Err(failure));

        let error = service(users, MockPasswordHasher::new())
            .authenticate(&credentials("leo", "s3cret"))
            .await
            .expect_err("repository failure");

        assert_eq!(error.code(), expected);
    }
}
