//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};

use crate::domain::{Error, User};
use crate::inbound::http::session::SessionContext;

/// Path of the route installed by [`test_login`].
pub const TEST_LOGIN_PATH: &str = "/test-login";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler logging in whichever user is posted as JSON.
pub async fn test_login(
    session: SessionContext,
    user: web::Json<User>,
) -> Result<HttpResponse, Error> {
    session.persist_user(&user)?;
    Ok(HttpResponse::Ok().finish())
}

/// The `session` cookie set by a response.
///
/// # Panics
///
/// Panics when the response sets no session cookie.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
