//! Page rendering boundary.
//!
//! Handlers describe a page as a [`View`]: a template name plus a context of
//! named values. A [`Presenter`] turns it into a response. The shipped
//! [`JsonPresenter`] emits the view itself as JSON so any front end, or a
//! test, can consume it.

use actix_web::HttpResponse;
use pagination::{Page, PageLinks};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::domain::Error;

/// Templates the blog renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Site-wide post listing.
    Index,
    /// Posts in one group.
    GroupList,
    /// Posts by one author.
    Profile,
    /// A single post with its comments.
    PostDetail,
    /// The post create/edit form.
    CreatePost,
}

impl Template {
    /// Template path.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Index => "posts/index.html",
            Self::GroupList => "posts/group_list.html",
            Self::Profile => "posts/profile.html",
            Self::PostDetail => "posts/post_detail.html",
            Self::CreatePost => "posts/create_post.html",
        }
    }
}

/// Named values handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `key`.
    ///
    /// # Errors
    ///
    /// Fails with an internal error when the value cannot be serialised.
    pub fn insert(mut self, key: &str, value: impl Serialize) -> Result<Self, Error> {
        let value = serde_json::to_value(value).map_err(|err| {
            Error::internal(format!("failed to serialise context value {key}: {err}"))
        })?;
        self.0.insert(key.to_owned(), value);
        Ok(self)
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// A page ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    /// Template path.
    #[serde(serialize_with = "serialize_template")]
    pub template: Template,
    /// Template context.
    pub context: Context,
}

fn serialize_template<S: serde::Serializer>(
    template: &Template,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(template.name())
}

impl View {
    /// A view with an empty context.
    pub fn new(template: Template) -> Self {
        Self {
            template,
            context: Context::new(),
        }
    }

    /// Add a context value.
    ///
    /// # Errors
    ///
    /// See [`Context::insert`].
    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, Error> {
        self.context = self.context.insert(key, value)?;
        Ok(self)
    }
}

/// A page of items together with its navigation links.
#[derive(Debug, Serialize)]
pub struct PageObject<'a, T> {
    /// The page.
    #[serde(flatten)]
    pub page: &'a Page<T>,
    /// Links to neighbouring pages.
    pub links: PageLinks,
}

impl<'a, T> PageObject<'a, T> {
    /// Pair a page with links built from the request URL.
    pub fn new(page: &'a Page<T>, request_url: &Url) -> Self {
        Self {
            page,
            links: PageLinks::for_page(request_url, page),
        }
    }
}

/// Renders views into responses.
pub trait Presenter: Send + Sync {
    /// Render a view with `200 OK`.
    ///
    /// # Errors
    ///
    /// Implementations fail when the view cannot be rendered.
    fn render(&self, view: &View) -> Result<HttpResponse, Error>;
}

/// Presenter returning `{"template": ..., "context": {...}}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn render(&self, view: &View) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::Ok().json(view))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use pagination::{PageRequest, Paginator};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(Template::Index, "posts/index.html")]
    #[case(Template::GroupList, "posts/group_list.html")]
    #[case(Template::Profile, "posts/profile.html")]
    #[case(Template::PostDetail, "posts/post_detail.html")]
    #[case(Template::CreatePost, "posts/create_post.html")]
    fn template_names(#[case] template: Template, #[case] expected: &str) {
        assert_eq!(template.name(), expected);
    }

    #[rstest]
    fn page_objects_flatten_the_page_and_add_links() {
        let page = Paginator::new(13, 10)
            .expect("page size")
            .get_page(PageRequest::Number(2))
            .into_page(vec!["a", "b", "c"]);
        let url = Url::parse("http://blog.test/group/cats/?page=2").expect("url");

        let value = serde_json::to_value(PageObject::new(&page, &url)).expect("serialise");

        assert_eq!(value["number"], 2);
        assert_eq!(value["items"], json!(["a", "b", "c"]));
        assert_eq!(value["links"]["previous"], "http://blog.test/group/cats/?page=1");
        assert!(value["links"].get("next").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn json_presenter_wraps_template_and_context() {
        let view = View::new(Template::PostDetail)
            .with("is_edit", true)
            .expect("context value");

        let response = JsonPresenter.render(&view).expect("rendered");
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(
            body,
            json!({"template": "posts/post_detail.html", "context": {"is_edit": true}})
        );
    }
}
