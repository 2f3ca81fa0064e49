//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between Diesel rows (`models.rs`, `schema.rs`,
//! both private) and domain types, and map database failures into each
//! port's error type. Connections come from a `bb8` pool of `diesel-async`
//! connections.
//!
//! ```ignore
//! use blog_backend::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/blog")).await?;
//! let posts = DieselPostRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_comment_repository;
mod diesel_group_repository;
mod diesel_post_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod row_conversion;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{
    MIGRATIONS, MigrationError, run_pending_migrations, run_pending_migrations_blocking,
};
pub use pool::{DbPool, PoolConfig, PoolError};
