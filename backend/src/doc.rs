//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the domain types they return
//! and the session cookie security scheme. Swagger UI serves it in debug
//! builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::forms::{FieldErrors, FieldKind, FieldSpec, FormSchema, FormView, GroupChoice};
use crate::domain::{
    Comment, CommentId, CommentText, Error, ErrorCode, Group, GroupId, GroupSlug, ImageRef, Post,
    PostId, PostText, User, UserId, Username,
};
use crate::inbound::http::form_input::{CommentFormBody, PostFormBody};
use crate::inbound::http::users::LoginRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /auth/login/.",
            ))),
        );
    }
}

/// OpenAPI document for the blog.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Blog backend",
        description = "Posts, groups, authors and comments with session authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::posts::index,
        crate::inbound::http::posts::group_posts,
        crate::inbound::http::posts::profile,
        crate::inbound::http::posts::post_detail,
        crate::inbound::http::posts::create_post_form,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::edit_post_form,
        crate::inbound::http::posts::edit_post,
        crate::inbound::http::posts::add_comment,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error, ErrorCode, User, UserId, Username, Group, GroupId, GroupSlug, Post, PostId,
        PostText, ImageRef, Comment, CommentId, CommentText, FormView, FormSchema, FieldSpec,
        FieldKind, FieldErrors, GroupChoice, LoginRequest, PostFormBody, CommentFormBody
    )),
    tags(
        (name = "posts", description = "Listings, post pages and post forms"),
        (name = "auth", description = "Session login and logout"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
