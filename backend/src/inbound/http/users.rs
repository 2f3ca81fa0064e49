//! Login and logout handlers.
//!
//! ```text
//! POST /auth/login/?next=/create/ {"username":"leo","password":"s3cret"}
//! POST /auth/logout/
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::IntoParams;

use crate::domain::{Error, LoginCredentials, LoginValidationError, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /auth/login/`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Where to go after logging in.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NextQuery {
    /// Local path to redirect to.
    pub next: Option<String>,
}

/// Accept only site-local paths so the redirect cannot leave the site.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
}

/// Authenticate and establish a session.
///
/// Responds with the user as JSON, or `303 See Other` to `next` when one
/// was given.
#[utoipa::path(
    post,
    path = "/auth/login/",
    params(NextQuery),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 303, description = "Login success, redirecting to `next`"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NextQuery>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user)?;
    info!(user = %user.username(), "user logged in");
    match safe_next(query.next.as_deref()) {
        Some(next) => Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, next.to_owned()))
            .finish()),
        None => Ok(HttpResponse::Ok().json(user)),
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// End the session.
#[utoipa::path(
    post,
    path = "/auth/logout/",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout/")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{MockLoginService, MockPostCommand, MockPostListingQuery};
    use crate::domain::test_fixtures;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::test_session_middleware;

    fn state(login_service: MockLoginService) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            listing: Arc::new(MockPostListingQuery::new()),
            commands: Arc::new(MockPostCommand::new()),
            login: Arc::new(login_service),
        }))
    }

    fn accepting(user: User) -> MockLoginService {
        let mut login_service = MockLoginService::new();
        login_service
            .expect_authenticate()
            .withf(|credentials| credentials.username() == "leo")
            .returning(move |_| Ok(user.clone()));
        login_service
    }

    async fn post_login(
        login_service: MockLoginService,
        uri: &str,
        username: &str,
        password: &str,
    ) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(login_service))
                .wrap(test_session_middleware())
                .service(super::login)
                .service(logout),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .set_json(LoginRequest {
                username: username.into(),
                password: password.into(),
            })
            .to_request();
        actix_test::call_service(&app, request).await
    }

    #[rstest]
    #[actix_web::test]
    async fn successful_login_sets_the_session_cookie() {
        let leo = test_fixtures::user("leo");
        let response = post_login(accepting(leo.clone()), "/auth/login/", "leo", "s3cret").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["username"], "leo");
    }

    #[rstest]
    #[case("/create/", Some("/create/"))]
    #[case("//evil.example/", None)]
    #[case("https://evil.example/", None)]
    #[actix_web::test]
    async fn next_redirects_only_to_local_paths(
        #[case] next: &str,
        #[case] expected: Option<&str>,
    ) {
        let leo = test_fixtures::user("leo");
        let uri = format!("/auth/login/?next={next}");
        let response = post_login(accepting(leo), &uri, "leo", "s3cret").await;

        match expected {
            Some(location) => {
                assert_eq!(response.status(), StatusCode::SEE_OTHER);
                assert_eq!(
                    response
                        .headers()
                        .get(header::LOCATION)
                        .and_then(|value| value.to_str().ok()),
                    Some(location)
                );
            }
            None => assert_eq!(response.status(), StatusCode::OK),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn rejected_credentials_are_unauthorised() {
        let mut login_service = MockLoginService::new();
        login_service
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("invalid credentials")));

        let response = post_login(login_service, "/auth/login/", "leo", "wrong").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("   ", "password", "username", "empty_username")]
    #[case("leo", "", "password", "empty_password")]
    #[actix_web::test]
    async fn blank_fields_are_invalid_requests(
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mut login_service = MockLoginService::new();
        login_service.expect_authenticate().never();

        let response = post_login(login_service, "/auth/login/", username, password).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_clears_the_session() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(MockLoginService::new()))
                .wrap(test_session_middleware())
                .service(logout),
        )
        .await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/auth/logout/").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
