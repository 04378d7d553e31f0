//! # mazurka-pool
//!
//! Bounded asynchronous connection pooling for the mazurka backend.
//!
//! The pool owns up to `max_connections` physical connections, opens them
//! lazily, and lends them out behind an RAII guard so release cannot be
//! forgotten. The backend is a trait seam: `PgConnector` talks to
//! PostgreSQL via tokio-postgres, `MockConnector` answers from memory for
//! tests.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mazurka_pool::{PgConnector, Pool, PoolOptions};
//!
//! # async fn demo() -> mazurka_pool::PoolResult<()> {
//! let pool = Pool::new(
//!     Arc::new(PgConnector::new("postgres://postgres@localhost:5432/postgres")),
//!     PoolOptions::new().with_max_connections(10),
//! );
//! let rows = pool.query("SELECT * FROM users", &[]).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod mock;
pub mod pool;
pub mod postgres;
pub mod row;

pub use connection::{Connect, Connection, Param};
pub use error::{BackendError, PoolError, PoolResult};
pub use mock::MockConnector;
pub use pool::{Pool, PoolOptions, PooledConnection};
pub use postgres::PgConnector;
pub use row::Row;
