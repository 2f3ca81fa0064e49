//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: a single in-process store implementing every repository.
//! - **media**: content-addressed image files under the media root.
//! - **security**: Argon2 password hashing.
//!
//! Adapters translate between infrastructure and domain types; they hold no
//! business rules.

pub mod media;
pub mod memory;
pub mod persistence;
pub mod security;
