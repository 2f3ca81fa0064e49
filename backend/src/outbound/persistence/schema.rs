//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Keep in step with the migrations; `diesel print-schema` against a migrated
//! database regenerates the same shape.

diesel::table! {
    /// Registered authors.
    users (id) {
        /// UUID v4 primary key.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Registration time.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Topical communities posts may belong to.
    groups (id) {
        /// Surrogate key.
        id -> Int8,
        /// Unique URL slug.
        slug -> Varchar,
        /// Display title.
        title -> Varchar,
        /// Free-form description.
        description -> Text,
    }
}

diesel::table! {
    /// Published posts.
    posts (id) {
        /// Surrogate key.
        id -> Int8,
        /// Body text.
        text -> Text,
        /// Publication time, fixed at creation.
        pub_date -> Timestamptz,
        /// Owning author; deleting the user removes the post.
        author_id -> Uuid,
        /// Optional group; deleting the group clears it.
        group_id -> Nullable<Int8>,
        /// Image path relative to the media root.
        image -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Comments on posts.
    comments (id) {
        /// Surrogate key.
        id -> Int8,
        /// Commented post.
        post_id -> Int8,
        /// Comment author.
        author_id -> Uuid,
        /// Comment body.
        text -> Text,
        /// Creation time.
        created -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::joinable!(posts -> groups (group_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, groups, posts, comments);
