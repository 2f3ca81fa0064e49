//! Embedded schema migrations.
//!
//! `diesel_migrations` needs a synchronous connection, so the run happens on
//! the blocking thread pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations from `backend/migrations`, compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {message}")]
    Connection { message: String },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply every pending migration synchronously. Returns the applied
/// migration versions.
///
/// # Errors
///
/// [`MigrationError`] when the database is unreachable or a migration fails.
pub fn run_pending_migrations_blocking(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|err| MigrationError::Connection {
            message: err.to_string(),
        })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Apply every pending migration from an async context.
///
/// # Errors
///
/// [`MigrationError`] when the database is unreachable, a migration fails,
/// or the blocking task panics.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations_blocking(&url))
        .await
        .map_err(|err| MigrationError::Apply {
            message: format!("migration task failed: {err}"),
        })??;
    if applied.is_empty() {
        info!("database schema up to date");
    } else {
        info!(count = applied.len(), versions = ?applied, "applied migrations");
    }
    Ok(())
}
