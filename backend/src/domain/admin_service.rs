//! Administrative use-cases run from the `manage` binary.
//!
//! Registers users and maintains the set of groups. There is no HTTP surface
//! for these operations.

use std::sync::Arc;

use tracing::info;
use zeroize::Zeroizing;

use super::ports::{GroupRepository, NewUser, PasswordHasher, UserRepository};
use super::repository_errors::{map_group_error, map_hasher_error, map_user_error};
use super::{Error, Group, GroupDraft, GroupSlug, User, Username};

/// Service behind the management commands.
#[derive(Clone)]
pub struct BlogAdminService<U, G, H> {
    users: Arc<U>,
    groups: Arc<G>,
    hasher: Arc<H>,
}

impl<U, G, H> BlogAdminService<U, G, H>
where
    U: UserRepository,
    G: GroupRepository,
    H: PasswordHasher,
{
    /// Create an admin service over the given ports.
    pub fn new(users: Arc<U>, groups: Arc<G>, hasher: Arc<H>) -> Self {
        Self {
            users,
            groups,
            hasher,
        }
    }

    /// Register a user with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// `invalid_request` for a malformed username or empty password,
    /// `conflict` when the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        password: Zeroizing<String>,
    ) -> Result<User, Error> {
        let username =
            Username::new(username).map_err(|err| Error::invalid_request(err.to_string()))?;
        if password.is_empty() {
            return Err(Error::invalid_request("password must not be empty"));
        }
        let password_hash = self.hasher.hash(&password).map_err(map_hasher_error)?;
        let user = self
            .users
            .create(&NewUser {
                username,
                password_hash,
            })
            .await
            .map_err(map_user_error)?;

        info!(user_id = %user.id(), username = %user.username(), "user created");
        Ok(user)
    }

    /// Create a group.
    ///
    /// # Errors
    ///
    /// `invalid_request` for a malformed slug or title, `conflict` when the
    /// slug is taken.
    pub async fn create_group(
        &self,
        slug: &str,
        title: &str,
        description: &str,
    ) -> Result<Group, Error> {
        let slug = GroupSlug::new(slug).map_err(|err| Error::invalid_request(err.to_string()))?;
        let draft = GroupDraft::new(slug, title, description)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let group = self.groups.create(&draft).await.map_err(map_group_error)?;

        info!(group_id = group.id().get(), slug = %group.slug(), "group created");
        Ok(group)
    }

    /// Delete a group. Its posts remain, without a group.
    ///
    /// # Errors
    ///
    /// `not_found` when no group has the slug.
    pub async fn delete_group(&self, slug: &str) -> Result<(), Error> {
        let slug = GroupSlug::new(slug).map_err(|err| Error::invalid_request(err.to_string()))?;
        let deleted = self.groups.delete(&slug).await.map_err(map_group_error)?;
        if !deleted {
            return Err(Error::not_found(format!("group {slug} not found")));
        }
        info!(%slug, "group deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Input validation and persistence mapping for admin commands.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        GroupRepositoryError, MockGroupRepository, MockPasswordHasher, MockUserRepository,
        UserRepositoryError,
    };
    use crate::domain::test_fixtures::group;
    use crate::domain::{ErrorCode, PasswordHash, UserId};

    type Service = BlogAdminService<MockUserRepository, MockGroupRepository, MockPasswordHasher>;

    fn service(
        users: MockUserRepository,
        groups: MockGroupRepository,
        hasher: MockPasswordHasher,
    ) -> Service {
        BlogAdminService::new(Arc::new(users), Arc::new(groups), Arc::new(hasher))
    }

    fn password(value: &str) -> Zeroizing<String> {
        Zeroizing::new(value.to_owned())
    }

    #[tokio::test]
    async fn create_user_stores_the_hash_not_the_password() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|plain| plain == "s3cret")
            .return_once(|_| Ok(PasswordHash::new("$argon2id$hashed")));
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|new_user| {
                new_user.username.as_str() == "leo"
                    && new_user.password_hash.as_str() == "$argon2id$hashed"
            })
            .return_once(|new_user| Ok(User::new(UserId::random(), new_user.username.clone())));

        let user = service(users, MockGroupRepository::new(), hasher)
            .create_user("leo", password("s3cret"))
            .await
            .expect("user created");

        assert_eq!(user.username().as_str(), "leo");
    }

    #[rstest]
    #[case("", "s3cret")]
    #[case("has space", "s3cret")]
    #[case("leo", "")]
    #[tokio::test]
    async fn create_user_rejects_bad_input(#[case] username: &str, #[case] plain: &str) {
        let mut users = MockUserRepository::new();
        users.expect_create().times(0);

        let error = service(users, MockGroupRepository::new(), MockPasswordHasher::new())
            .create_user(username, password(plain))
            .await
            .expect_err("bad input");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Ok(PasswordHash::new("$argon2id$hashed")));
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .return_once(|_| Err(UserRepositoryError::duplicate_username("leo")));

        let error = service(users, MockGroupRepository::new(), hasher)
            .create_user("leo", password("s3cret"))
            .await
            .expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn create_group_validates_and_persists() {
        let mut groups = MockGroupRepository::new();
        groups
            .expect_create()
            .withf(|draft| draft.slug().as_str() == "cats" && draft.title() == "Group cats")
            .return_once(|_| Ok(group(1, "cats")));

        let created = service(MockUserRepository::new(), groups, MockPasswordHasher::new())
            .create_group("cats", "Group cats", "")
            .await
            .expect("group created");

        assert_eq!(created.slug().as_str(), "cats");
    }

    #[rstest]
    #[case("Cats", "Title")]
    #[case("cats", "")]
    #[tokio::test]
    async fn create_group_rejects_bad_input(#[case] slug: &str, #[case] title: &str) {
        let error = service(
            MockUserRepository::new(),
            MockGroupRepository::new(),
            MockPasswordHasher::new(),
        )
        .create_group(slug, title, "")
        .await
        .expect_err("bad input");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let mut groups = MockGroupRepository::new();
        groups
            .expect_create()
            .return_once(|_| Err(GroupRepositoryError::duplicate_slug("cats")));

        let error = service(MockUserRepository::new(), groups, MockPasswordHasher::new())
            .create_group("cats", "Cats", "")
            .await
            .expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn delete_group_reports_missing_groups(
        #[case] existed: bool,
        #[case] expected: Option<ErrorCode>,
    ) {
        let mut groups = MockGroupRepository::new();
        groups.expect_delete().return_once(move |_| Ok(existed));

        let result = service(MockUserRepository::new(), groups, MockPasswordHasher::new())
            .delete_group("cats")
            .await;

        assert_eq!(result.err().map(|err| err.code()), expected);
    }
}
