//! Row to domain conversions.
//!
//! Stored rows pass back through the domain constructors, so a row that no
//! longer satisfies a domain rule surfaces as a query error rather than an
//! invalid entity. Callers wrap the returned message in their port error.

use crate::domain::{
    Comment, CommentId, CommentText, Group, GroupDraft, GroupId, GroupSlug, GroupValidationError,
    ImageRef, Post, PostId, PostText, PostValidationError, User, UserId, Username,
};

use super::models::{CommentRow, GroupRow, PostRow, UserRow};

pub(crate) fn user_from_row(row: UserRow) -> Result<User, String> {
    let username =
        Username::new(row.username).map_err(|err| format!("stored user is invalid: {err}"))?;
    Ok(User::new(UserId::from_uuid(row.id), username))
}

pub(crate) fn group_from_row(row: GroupRow) -> Result<Group, String> {
    let invalid = |err: GroupValidationError| format!("stored group is invalid: {err}");
    let slug = GroupSlug::new(row.slug).map_err(invalid)?;
    let draft = GroupDraft::new(slug, row.title, row.description).map_err(invalid)?;
    Ok(Group::from_draft(GroupId::new(row.id), draft))
}

pub(crate) fn post_from_rows(
    row: PostRow,
    author: UserRow,
    group: Option<GroupRow>,
) -> Result<Post, String> {
    let invalid = |err: PostValidationError| format!("stored post is invalid: {err}");
    let text = PostText::new(row.text).map_err(invalid)?;
    let image = row.image.map(ImageRef::new).transpose().map_err(invalid)?;
    let author = user_from_row(author)?;
    let group = group.map(group_from_row).transpose()?;
    Ok(Post::new(
        PostId::new(row.id),
        text,
        row.pub_date,
        author,
        group,
        image,
    ))
}

pub(crate) fn comment_from_rows(row: CommentRow, author: UserRow) -> Result<Comment, String> {
    let text =
        CommentText::new(row.text).map_err(|err| format!("stored comment is invalid: {err}"))?;
    Ok(Comment::new(
        CommentId::new(row.id),
        PostId::new(row.post_id),
        user_from_row(author)?,
        text,
        row.created,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    fn author_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "leo".to_owned(),
        }
    }

    fn post_row(text: &str, image: Option<&str>) -> PostRow {
        PostRow {
            id: 3,
            text: text.to_owned(),
            pub_date: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid"),
            author_id: Uuid::new_v4(),
            group_id: Some(2),
            image: image.map(str::to_owned),
        }
    }

    #[rstest]
    fn post_rows_build_posts_with_author_and_group() {
        let group = GroupRow {
            id: 2,
            slug: "cats".to_owned(),
            title: "Cats".to_owned(),
            description: String::new(),
        };
        let row = post_row("hello", Some("posts/a.png"));
        let post = post_from_rows(row, author_row(), Some(group)).expect("valid rows");

        assert_eq!(post.id(), PostId::new(3));
        assert_eq!(post.author().username().as_str(), "leo");
        assert_eq!(post.group().map(|group| group.slug().as_str()), Some("cats"));
        assert_eq!(post.image().map(ImageRef::as_str), Some("posts/a.png"));
    }

    #[rstest]
    #[case("   ", None)]
    #[case("hello", Some("../etc/passwd"))]
    fn invalid_rows_are_reported(#[case] text: &str, #[case] image: Option<&str>) {
        let error = post_from_rows(post_row(text, image), author_row(), None)
            .expect_err("invalid row");
        assert!(error.starts_with("stored post is invalid"));
    }

    #[rstest]
    fn invalid_usernames_are_reported() {
        let error = user_from_row(UserRow {
            id: Uuid::new_v4(),
            username: "no spaces allowed".to_owned(),
        })
        .expect_err("invalid username");
        assert!(error.starts_with("stored user is invalid"));
    }
}
