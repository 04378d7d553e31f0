use std::time::Duration;

use thiserror::Error;

/// Boxed source error produced by a pool backend (driver, socket, mock).
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure modes of pool operations.
///
/// Callers are expected to log the full chain and map every variant to an
/// opaque client-facing error; none of these carry user data.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The acquire budget ran out before a connection was free and usable,
    /// whether waiting for capacity or opening one lazily.
    #[error("connection pool exhausted after waiting {waited:?}")]
    Exhausted { waited: Duration },

    /// Opening a new physical connection failed.
    #[error("failed to open database connection")]
    Connect(#[source] BackendError),

    /// A statement failed on an acquired connection.
    #[error("database query failed")]
    Query(#[source] BackendError),

    /// The pool has been closed; no further acquires are possible.
    #[error("connection pool is closed")]
    Closed,
}

pub type PoolResult<T> = Result<T, PoolError>;
