//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie stores the logged-in user's id and username. Handlers
//! read them back as an [`Actor`] and pass it into service calls.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Actor, Error, User, UserId, Username};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const USERNAME_KEY: &str = "username";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Remember the authenticated user in the session cookie.
    pub fn persist_user(&self, user: &User) -> Result<(), Error> {
        self.0.renew();
        self.insert(USER_ID_KEY, &user.id().to_string())?;
        self.insert(USERNAME_KEY, user.username().as_str())
    }

    /// Forget the logged-in user.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// The logged-in user, if any.
    ///
    /// A cookie holding values that no longer parse is treated as anonymous.
    pub fn actor(&self) -> Result<Option<Actor>, Error> {
        let (Some(raw_id), Some(raw_name)) = (self.get(USER_ID_KEY)?, self.get(USERNAME_KEY)?)
        else {
            return Ok(None);
        };
        match (UserId::new(&raw_id), Username::new(raw_name)) {
            (Ok(id), Ok(username)) => Ok(Some(Actor::new(id, username))),
            (Err(error), _) => {
                warn!(%error, "invalid user id in session cookie");
                Ok(None)
            }
            (_, Err(error)) => {
                warn!(%error, "invalid username in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a logged-in user or return `401 Unauthorized`.
    pub fn require_actor(&self) -> Result<Actor, Error> {
        self.actor()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    fn insert(&self, key: &str, value: &str) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn fixture_user() -> User {
        User::try_from_strings(FIXTURE_ID, "leo").expect("fixture user")
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let actor = session.require_actor()?;
        Ok(HttpResponse::Ok().body(format!("{}:{}", actor.user_id(), actor.username())))
    }

    async fn login(session: SessionContext) -> Result<HttpResponse, Error> {
        session.persist_user(&fixture_user())?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn logout(session: SessionContext) -> HttpResponse {
        session.clear();
        HttpResponse::Ok().finish()
    }

    async fn tamper(session: Session) -> HttpResponse {
        session
            .insert(USER_ID_KEY, "not-a-uuid")
            .expect("set invalid user id");
        session.insert(USERNAME_KEY, "leo").expect("set username");
        HttpResponse::Ok().finish()
    }

    async fn call(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        uri: &str,
        cookie: Option<Cookie<'static>>,
    ) -> actix_web::dev::ServiceResponse {
        let mut request = test::TestRequest::get().uri(uri);
        if let Some(cookie) = cookie {
            request = request.cookie(cookie);
        }
        test::call_service(app, request.to_request()).await
    }

    #[rstest]
    #[actix_web::test]
    async fn round_trips_the_actor() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/login", web::get().to(login))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let login_res = call(&app, "/login", None).await;
        let cookie = session_cookie(&login_res);
        let res = call(&app, "/whoami", Some(cookie)).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, format!("{FIXTURE_ID}:leo"));
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_requests_are_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = call(&app, "/whoami", None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn tampered_ids_read_as_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/tamper", web::get().to(tamper))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let cookie = session_cookie(&call(&app, "/tamper", None).await);
        let res = call(&app, "/whoami", Some(cookie)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn clearing_forgets_the_actor() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/login", web::get().to(login))
                .route("/logout", web::get().to(logout))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let cookie = session_cookie(&call(&app, "/login", None).await);
        let logout_res = call(&app, "/logout", Some(cookie)).await;
        let cleared = session_cookie(&logout_res);
        let res = call(&app, "/whoami", Some(cleared)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
