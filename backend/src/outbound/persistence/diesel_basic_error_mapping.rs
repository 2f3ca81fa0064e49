//! Diesel error classification shared by the blog repositories.
//!
//! Each repository supplies constructors for its own port error; this module
//! decides which one applies.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse classification of a Diesel failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection,
    /// A unique constraint rejected the write.
    UniqueViolation,
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation,
    /// Anything else.
    Query,
}

/// Classify a Diesel error, logging the database detail at debug level.
pub(crate) fn classify(error: &DieselError) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
            match kind {
                DatabaseErrorKind::ClosedConnection => DieselFailure::Connection,
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation,
                DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKeyViolation,
                _ => DieselFailure::Query,
            }
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            DieselFailure::Query
        }
    }
}

/// Map pool errors into a repository-specific connection error.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Map Diesel errors without constraint semantics into query or connection
/// errors. Database detail stays in the debug log, never in the message.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match classify(&error) {
        DieselFailure::Connection => connection("database connection error"),
        DieselFailure::UniqueViolation | DieselFailure::ForeignKeyViolation => {
            query("database constraint violated")
        }
        DieselFailure::Query => match error {
            DieselError::NotFound => query("record not found"),
            DieselError::QueryBuilderError(_) => query("database query error"),
            _ => query("database error"),
        },
    }
}
