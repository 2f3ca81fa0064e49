//! Builders shared by domain unit tests.

use chrono::{DateTime, TimeZone, Utc};

use super::{Group, GroupDraft, GroupId, GroupSlug, Post, PostId, PostText, User, UserId, Username};

pub(crate) fn timestamp(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn user(username: &str) -> User {
    User::new(
        UserId::random(),
        Username::new(username).expect("valid username"),
    )
}

pub(crate) fn group(id: i64, slug: &str) -> Group {
    let draft = GroupDraft::new(
        GroupSlug::new(slug).expect("valid slug"),
        format!("Group {slug}"),
        "fixture group",
    )
    .expect("valid draft");
    Group::from_draft(GroupId::new(id), draft)
}

pub(crate) fn post(id: i64, author: &User, group: Option<&Group>) -> Post {
    Post::new(
        PostId::new(id),
        PostText::new(format!("post number {id}")).expect("valid text"),
        timestamp(0),
        author.clone(),
        group.cloned(),
        None,
    )
}
