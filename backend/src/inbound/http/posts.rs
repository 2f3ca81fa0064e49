//! Blog page handlers.
//!
//! ```text
//! GET  /                       all posts, paginated
//! GET  /group/{slug}/          posts in a group
//! GET  /profile/{username}/    posts by an author
//! GET  /posts/{id}/            one post with its comments
//! GET  /create/                empty post form          (login)
//! POST /create/                publish a post           (login)
//! GET  /posts/{id}/edit/       prefilled post form      (author)
//! POST /posts/{id}/edit/       save an edited post      (author)
//! POST /posts/{id}/comment/    comment on a post        (login)
//! ```
//!
//! Listing pages accept `?page=`. Anonymous visitors to login-only pages
//! are redirected to the login page; non-authors trying to edit a post are
//! redirected to the post.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use pagination::PageRequest;
use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded;
use utoipa::IntoParams;

use crate::domain::forms::{COMMENT_FORM, FieldErrors, FormView, POST_FORM, PostFormInput};
use crate::domain::ports::{
    CreateCommentRequest, CreatePostRequest, EditPostRequest, ListPostsRequest, ListingSubject,
    PostListing,
};
use crate::domain::{Actor, Error, ErrorCode, GroupSlug, Post, PostId, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::form_input::{
    CommentFormBody, CommentSubmission, PostFormBody, PostSubmission,
};
use crate::inbound::http::presenter::{PageObject, Template, View};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login page anonymous users are sent to.
pub const LOGIN_URL: &str = "/auth/login/";

/// Query string of listing pages.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number, or `last`. Anything else shows the first page.
    pub page: Option<String>,
}

fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

fn login_redirect(req: &HttpRequest) -> HttpResponse {
    let next: String = form_urlencoded::byte_serialize(req.path().as_bytes()).collect();
    see_other(format!("{LOGIN_URL}?next={next}"))
}

fn detail_url(post_id: PostId) -> String {
    format!("/posts/{post_id}/")
}

fn profile_url(username: &Username) -> String {
    format!("/profile/{username}/")
}

/// Field messages carried by a validation failure, or the error itself.
fn field_errors(error: Error) -> Result<FieldErrors, Error> {
    FieldErrors::from_error(&error).ok_or(error)
}

fn post_form(input: &PostFormInput) -> FormView {
    let mut form = FormView::unbound(POST_FORM);
    if let Some(text) = &input.text {
        form = form.with_value("text", text.clone());
    }
    if let Some(group) = &input.group {
        form = form.with_value("group", group.clone());
    }
    form
}

fn edit_form(post: &Post) -> FormView {
    let mut form = FormView::unbound(POST_FORM).with_value("text", post.text().as_str());
    if let Some(group) = post.group() {
        form = form.with_value("group", group.id().to_string());
    }
    form.current_image = post.image().map(|image| image.as_str().to_owned());
    form
}

async fn render_listing(
    state: &HttpState,
    req: &HttpRequest,
    listing: PostListing,
    query: &PageQuery,
) -> ApiResult<HttpResponse> {
    let response = state
        .listing
        .list_posts(ListPostsRequest {
            listing,
            page: PageRequest::parse(query.page.as_deref()),
        })
        .await?;
    let request_url = req.full_url();
    let view = match response.subject {
        ListingSubject::Index => View::new(Template::Index),
        ListingSubject::Group(group) => View::new(Template::GroupList).with("group", group)?,
        ListingSubject::Author(author) => View::new(Template::Profile).with("author", author)?,
    };
    let view = view.with("page_obj", PageObject::new(&response.page, &request_url))?;
    state.presenter.render(&view)
}

async fn render_detail(
    state: &HttpState,
    post_id: PostId,
    form: FormView,
) -> ApiResult<HttpResponse> {
    let detail = state.listing.post_detail(post_id).await?;
    let view = View::new(Template::PostDetail)
        .with("post", &detail.post)?
        .with("comments", &detail.comments)?
        .with("author_posts_count", detail.author_posts_count)?
        .with("form", form)?;
    state.presenter.render(&view)
}

async fn render_post_form(
    state: &HttpState,
    form: FormView,
    editing: Option<&Post>,
) -> ApiResult<HttpResponse> {
    let choices = state.listing.group_choices().await?;
    let mut view = View::new(Template::CreatePost).with("form", form.with_choices(choices))?;
    if let Some(post) = editing {
        view = view.with("is_edit", true)?.with("post", post)?;
    }
    state.presenter.render(&view)
}

/// Every post, newest first.
#[utoipa::path(
    get,
    path = "/",
    params(PageQuery),
    responses(
        (status = 200, description = "Rendered `posts/index.html`"),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["posts"],
    operation_id = "index"
)]
#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    render_listing(&state, &req, PostListing::All, &query).await
}

/// Posts in one group.
#[utoipa::path(
    get,
    path = "/group/{slug}/",
    params(("slug" = String, Path, description = "Group slug"), PageQuery),
    responses(
        (status = 200, description = "Rendered `posts/group_list.html`"),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["posts"],
    operation_id = "groupPosts"
)]
#[get("/group/{slug}/")]
pub async fn group_posts(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let slug = GroupSlug::new(raw.as_str())
        .map_err(|_| Error::not_found(format!("group {raw} not found")))?;
    render_listing(&state, &req, PostListing::Group(slug), &query).await
}

/// Posts by one author.
#[utoipa::path(
    get,
    path = "/profile/{username}/",
    params(("username" = String, Path, description = "Author username"), PageQuery),
    responses(
        (status = 200, description = "Rendered `posts/profile.html`"),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["posts"],
    operation_id = "profile"
)]
#[get("/profile/{username}/")]
pub async fn profile(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let username = Username::new(raw.as_str())
        .map_err(|_| Error::not_found(format!("user {raw} not found")))?;
    render_listing(&state, &req, PostListing::Author(username), &query).await
}

/// A post with its comments and an empty comment form.
#[utoipa::path(
    get,
    path = "/posts/{post_id}/",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Rendered `posts/post_detail.html`"),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "postDetail"
)]
#[get("/posts/{post_id}/")]
pub async fn post_detail(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    render_detail(&state, post_id, FormView::unbound(COMMENT_FORM)).await
}

/// Empty post form.
#[utoipa::path(
    get,
    path = "/create/",
    responses(
        (status = 200, description = "Rendered `posts/create_post.html`"),
        (status = 303, description = "Login required")
    ),
    tags = ["posts"],
    operation_id = "createPostForm"
)]
#[get("/create/")]
pub async fn create_post_form(
    state: web::Data<HttpState>,
    req: HttpRequest,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if session.actor()?.is_none() {
        return Ok(login_redirect(&req));
    }
    render_post_form(&state, FormView::unbound(POST_FORM), None).await
}

/// Publish a post and redirect to the author's profile.
#[utoipa::path(
    post,
    path = "/create/",
    request_body(content = PostFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Form re-rendered with field errors"),
        (status = 303, description = "Published, or login required")
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/create/")]
pub async fn create_post(
    state: web::Data<HttpState>,
    req: HttpRequest,
    session: SessionContext,
    PostSubmission(input): PostSubmission,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.actor()? else {
        return Ok(login_redirect(&req));
    };
    let form = post_form(&input);
    match state
        .commands
        .create_post(CreatePostRequest {
            actor: actor.clone(),
            form: input,
        })
        .await
    {
        Ok(post) => {
            debug!(post_id = %post.id(), "redirecting to author profile");
            Ok(see_other(profile_url(actor.username())))
        }
        Err(error) => {
            let errors = field_errors(error)?;
            debug!(fields = ?errors.fields().collect::<Vec<_>>(), "post form rejected");
            render_post_form(&state, form.with_errors(errors), None).await
        }
    }
}

/// Form prefilled with the post's current values. Author only.
#[utoipa::path(
    get,
    path = "/posts/{post_id}/edit/",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Rendered `posts/create_post.html` with `is_edit`"),
        (status = 303, description = "Login required, or not the author"),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "editPostForm"
)]
#[get("/posts/{post_id}/edit/")]
pub async fn edit_post_form(
    state: web::Data<HttpState>,
    req: HttpRequest,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.actor()? else {
        return Ok(login_redirect(&req));
    };
    let post_id = PostId::new(path.into_inner());
    match load_for_edit(&state, &actor, post_id).await? {
        Some(post) => render_post_form(&state, edit_form(&post), Some(&post)).await,
        None => Ok(see_other(detail_url(post_id))),
    }
}

/// The post when the actor may edit it, `None` when they are not the author.
async fn load_for_edit(
    state: &HttpState,
    actor: &Actor,
    post_id: PostId,
) -> ApiResult<Option<Post>> {
    match state.listing.post_for_edit(actor, post_id).await {
        Ok(post) => Ok(Some(post)),
        Err(error) if error.code() == ErrorCode::Forbidden => {
            debug!(%post_id, user = %actor.username(), "edit by non-author redirected");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Save an edited post and redirect to it. Author only.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/edit/",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body(content = PostFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Form re-rendered with field errors"),
        (status = 303, description = "Saved, login required, or not the author"),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "editPost"
)]
#[post("/posts/{post_id}/edit/")]
pub async fn edit_post(
    state: web::Data<HttpState>,
    req: HttpRequest,
    session: SessionContext,
    path: web::Path<i64>,
    PostSubmission(input): PostSubmission,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.actor()? else {
        return Ok(login_redirect(&req));
    };
    let post_id = PostId::new(path.into_inner());
    let form = post_form(&input);
    let result = state
        .commands
        .edit_post(EditPostRequest {
            actor: actor.clone(),
            post_id,
            form: input,
        })
        .await;
    match result {
        Ok(post) => {
            debug!(post_id = %post.id(), "redirecting to edited post");
            Ok(see_other(detail_url(post_id)))
        }
        Err(error) if error.code() == ErrorCode::Forbidden => Ok(see_other(detail_url(post_id))),
        Err(error) => {
            let errors = field_errors(error)?;
            let Some(post) = load_for_edit(&state, &actor, post_id).await? else {
                return Ok(see_other(detail_url(post_id)));
            };
            let mut form = form.with_errors(errors);
            form.current_image = post.image().map(|image| image.as_str().to_owned());
            render_post_form(&state, form, Some(&post)).await
        }
    }
}

/// Comment on a post and redirect back to it.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/comment/",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body(content = CommentFormBody, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Post page re-rendered with comment form errors"),
        (status = 303, description = "Comment added, or login required"),
        (status = 404, description = "Unknown post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "addComment"
)]
#[post("/posts/{post_id}/comment/")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    req: HttpRequest,
    session: SessionContext,
    path: web::Path<i64>,
    CommentSubmission(input): CommentSubmission,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.actor()? else {
        return Ok(login_redirect(&req));
    };
    let post_id = PostId::new(path.into_inner());
    let mut form = FormView::unbound(COMMENT_FORM);
    if let Some(text) = &input.text {
        form = form.with_value("text", text.clone());
    }
    match state
        .commands
        .create_comment(CreateCommentRequest {
            actor,
            post_id,
            form: input,
        })
        .await
    {
        Ok(comment) => {
            debug!(comment_id = comment.id().get(), %post_id, "comment added");
            Ok(see_other(detail_url(post_id)))
        }
        Err(error) => {
            let errors = field_errors(error)?;
            render_detail(&state, post_id, form.with_errors(errors)).await
        }
    }
}

/// Register the blog page handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(group_posts)
        .service(profile)
        .service(post_detail)
        .service(create_post_form)
        .service(create_post)
        .service(edit_post_form)
        .service(edit_post)
        .service(add_comment);
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
