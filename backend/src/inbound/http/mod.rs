//! HTTP inbound adapter: blog pages, authentication and health probes.

pub mod error;
pub mod form_input;
pub mod health;
pub mod posts;
pub mod presenter;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
