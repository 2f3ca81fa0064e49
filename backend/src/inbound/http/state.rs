//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, PostCommand, PostListingQuery};
use crate::inbound::http::presenter::{JsonPresenter, Presenter};

/// Parameter object bundling the port implementations handlers call.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Read side: listings, detail pages, form data.
    pub listing: Arc<dyn PostListingQuery>,
    /// Write side: posts and comments.
    pub commands: Arc<dyn PostCommand>,
    /// Credential checks for `/auth/login/`.
    pub login: Arc<dyn LoginService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Read side: listings, detail pages, form data.
    pub listing: Arc<dyn PostListingQuery>,
    /// Write side: posts and comments.
    pub commands: Arc<dyn PostCommand>,
    /// Credential checks for `/auth/login/`.
    pub login: Arc<dyn LoginService>,
    /// Page renderer.
    pub presenter: Arc<dyn Presenter>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state rendering pages with [`JsonPresenter`].
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            listing,
            commands,
            login,
        } = ports;
        Self {
            listing,
            commands,
            login,
            presenter: Arc::new(JsonPresenter),
        }
    }

    /// Swap the page renderer.
    #[must_use]
    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }
}
