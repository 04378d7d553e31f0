//! Startup reachability probe.
//!
//! Fired once in the background right after the pool is built: borrow a
//! connection, ask the server for its clock, give the connection back. A
//! failure is loud in the log but never fatal. The health endpoint and the
//! static routes keep serving while the database is down; `/users` surfaces
//! its own errors per request.

use mazurka_pool::{Pool, PoolError};

use crate::error::error_chain;

/// Statement used to verify reachability.
const PROBE_SQL: &str = "SELECT NOW()";

/// Acquire one connection, run the probe statement, release.
pub async fn run(pool: &Pool) -> Result<(), PoolError> {
    let mut conn = pool.acquire().await?;
    conn.query(PROBE_SQL, &[]).await?;
    Ok(())
}

/// Run the probe in the background and log its outcome. Startup does not
/// wait for it.
pub fn spawn(pool: Pool) {
    tokio::spawn(async move {
        match run(&pool).await {
            Ok(()) => tracing::info!("connected to database"),
            Err(e) => tracing::error!("startup probe failed: {}", error_chain(&e)),
        }
    });
}
