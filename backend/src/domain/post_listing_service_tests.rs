//! Tests for the post listing service.

use std::sync::Arc;

use mockall::predicate::eq;
use pagination::PageRequest;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockCommentRepository, MockGroupRepository, MockPostRepository, MockUserRepository,
    PostRepositoryError,
};
use crate::domain::test_fixtures::{group, post, user};
use crate::domain::{ErrorCode, GroupId, GroupSlug, Username};

struct Mocks {
    posts: MockPostRepository,
    groups: MockGroupRepository,
    users: MockUserRepository,
    comments: MockCommentRepository,
}

impl Mocks {
    fn new() -> Self {
        Self {
            posts: MockPostRepository::new(),
            groups: MockGroupRepository::new(),
            users: MockUserRepository::new(),
            comments: MockCommentRepository::new(),
        }
    }

    fn service(
        self,
    ) -> PostListingService<
        MockPostRepository,
        MockGroupRepository,
        MockUserRepository,
        MockCommentRepository,
    > {
        PostListingService::new(
            Arc::new(self.posts),
            Arc::new(self.groups),
            Arc::new(self.users),
            Arc::new(self.comments),
        )
    }
}

fn request(listing: PostListing, page: PageRequest) -> ListPostsRequest {
    ListPostsRequest { listing, page }
}

#[rstest]
#[case(PageRequest::First, 1, 0, 10)]
#[case(PageRequest::Number(2), 2, 10, 3)]
#[case(PageRequest::Number(3), 2, 10, 3)]
#[tokio::test]
async fn thirteen_posts_page_with_last_page_fallback(
    #[case] page: PageRequest,
    #[case] number: u64,
    #[case] offset: u64,
    #[case] limit: u64,
) {
    let author = user("leo");
    let mut mocks = Mocks::new();
    mocks
        .posts
        .expect_count()
        .with(eq(PostFilter::All))
        .return_once(|_| Ok(13));
    mocks
        .posts
        .expect_list()
        .with(eq(PostFilter::All), eq(offset), eq(limit))
        .return_once(move |_, offset, limit| {
            let start = i64::try_from(offset).expect("small offset");
            let end = start + i64::try_from(limit).expect("small limit");
            Ok((start..end).map(|id| post(id, &author, None)).collect())
        });

    let response = mocks
        .service()
        .list_posts(request(PostListing::All, page))
        .await
        .expect("listing succeeds");

    assert_eq!(response.subject, ListingSubject::Index);
    assert_eq!(response.page.number(), number);
    assert_eq!(response.page.count(), 13);
    assert_eq!(response.page.per_page(), 10);
    assert_eq!(response.page.items().len(), usize::try_from(limit).expect("small"));
}

#[tokio::test]
async fn empty_listing_skips_the_list_query() {
    let mut mocks = Mocks::new();
    mocks.posts.expect_count().return_once(|_| Ok(0));
    mocks.posts.expect_list().times(0);

    let response = mocks
        .service()
        .list_posts(request(PostListing::All, PageRequest::Number(5)))
        .await
        .expect("listing succeeds");

    assert_eq!(response.page.number(), 1);
    assert!(response.page.items().is_empty());
}

#[tokio::test]
async fn group_listing_filters_by_resolved_group() {
    let cats = group(7, "cats");
    let found = cats.clone();
    let mut mocks = Mocks::new();
    mocks
        .groups
        .expect_find_by_slug()
        .return_once(move |_| Ok(Some(found)));
    mocks
        .posts
        .expect_count()
        .with(eq(PostFilter::Group(cats.id())))
        .return_once(|_| Ok(1));
    let author = user("leo");
    let in_group = cats.clone();
    mocks
        .posts
        .expect_list()
        .with(eq(PostFilter::Group(cats.id())), eq(0_u64), eq(1_u64))
        .return_once(move |_, _, _| Ok(vec![post(1, &author, Some(&in_group))]));

    let slug = GroupSlug::new("cats").expect("valid slug");
    let response = mocks
        .service()
        .list_posts(request(PostListing::Group(slug), PageRequest::First))
        .await
        .expect("listing succeeds");

    assert_eq!(response.subject, ListingSubject::Group(cats));
    assert_eq!(response.page.items().len(), 1);
}

#[tokio::test]
async fn unknown_group_is_not_found() {
    let mut mocks = Mocks::new();
    mocks.groups.expect_find_by_slug().return_once(|_| Ok(None));
    mocks.posts.expect_count().times(0);

    let slug = GroupSlug::new("nope").expect("valid slug");
    let error = mocks
        .service()
        .list_posts(request(PostListing::Group(slug), PageRequest::First))
        .await
        .expect_err("unknown group");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn unknown_author_is_not_found() {
    let mut mocks = Mocks::new();
    mocks.users.expect_find_by_username().return_once(|_| Ok(None));

    let username = Username::new("ghost").expect("valid username");
    let error = mocks
        .service()
        .list_posts(request(PostListing::Author(username), PageRequest::First))
        .await
        .expect_err("unknown author");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn author_listing_filters_by_author_id() {
    let leo = user("leo");
    let found = leo.clone();
    let mut mocks = Mocks::new();
    mocks
        .users
        .expect_find_by_username()
        .return_once(move |_| Ok(Some(found)));
    mocks
        .posts
        .expect_count()
        .with(eq(PostFilter::Author(*leo.id())))
        .return_once(|_| Ok(0));

    let response = mocks
        .service()
        .list_posts(request(
            PostListing::Author(leo.username().clone()),
            PageRequest::First,
        ))
        .await
        .expect("listing succeeds");

    assert_eq!(response.subject, ListingSubject::Author(leo));
}

#[rstest]
#[case(PostRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(PostRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_failures_are_mapped(
    #[case] failure: PostRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut mocks = Mocks::new();
    mocks.posts.expect_count().return_once(move |_| Err(failure));

    let error = mocks
        .service()
        .list_posts(request(PostListing::All, PageRequest::First))
        .await
        .expect_err("repository failure");

    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn detail_includes_comments_and_author_post_count() {
    let leo = user("leo");
    let shown = post(3, &leo, None);
    let returned = shown.clone();
    let mut mocks = Mocks::new();
    mocks
        .posts
        .expect_find_by_id()
        .with(eq(PostId::new(3)))
        .return_once(move |_| Ok(Some(returned)));
    mocks
        .comments
        .expect_list_for_post()
        .return_once(|_| Ok(Vec::new()));
    mocks
        .posts
        .expect_count()
        .with(eq(PostFilter::Author(*leo.id())))
        .return_once(|_| Ok(4));

    let detail = mocks
        .service()
        .post_detail(PostId::new(3))
        .await
        .expect("detail loads");

    assert_eq!(detail.post, shown);
    assert!(detail.comments.is_empty());
    assert_eq!(detail.author_posts_count, 4);
}

#[tokio::test]
async fn detail_of_missing_post_is_not_found() {
    let mut mocks = Mocks::new();
    mocks.posts.expect_find_by_id().return_once(|_| Ok(None));

    let error = mocks
        .service()
        .post_detail(PostId::new(99))
        .await
        .expect_err("missing post");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn group_choices_follow_repository_order() {
    let mut mocks = Mocks::new();
    mocks
        .groups
        .expect_list_all()
        .return_once(|| Ok(vec![group(2, "birds"), group(1, "cats")]));

    let choices = mocks.service().group_choices().await.expect("choices load");

    let titles: Vec<_> = choices.iter().map(|choice| choice.title.as_str()).collect();
    assert_eq!(titles, ["Group birds", "Group cats"]);
    assert_eq!(choices.first().map(|choice| choice.id), Some(GroupId::new(2)));
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::Forbidden))]
#[tokio::test]
async fn edit_form_is_author_only(#[case] as_author: bool, #[case] expected: Option<ErrorCode>) {
    let leo = user("leo");
    let ann = user("ann");
    let actor = if as_author {
        Actor::from(&leo)
    } else {
        Actor::from(&ann)
    };
    let stored = post(5, &leo, None);
    let mut mocks = Mocks::new();
    mocks
        .posts
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));

    let result = mocks.service().post_for_edit(&actor, PostId::new(5)).await;

    assert_eq!(result.err().map(|err| err.code()), expected);
}
