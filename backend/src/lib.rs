//! Blog backend: posts, groups, authors and comments behind an actix-web
//! HTTP adapter.
//!
//! - [`domain`]: entities, forms, ports and services.
//! - [`inbound`]: HTTP handlers.
//! - [`outbound`]: PostgreSQL, in-memory, media and password adapters.
//! - [`middleware`]: request tracing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
