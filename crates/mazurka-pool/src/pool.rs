//! Bounded asynchronous connection pool.
//!
//! Capacity is a semaphore: every leased connection holds one permit, so at
//! most `max_connections` physical connections exist at a time. Connections
//! are opened lazily on first use, reused most-recently-returned-first, and
//! returned to the pool by the lease guard's `Drop` on every exit path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{Instant, timeout_at};

use crate::connection::{Connect, Connection, Param};
use crate::error::{PoolError, PoolResult};
use crate::row::Row;

/// Pool tuning knobs: capacity and how long an acquire may wait for it.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: usize,
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on open connections. Clamped to at least one.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// Budget for one whole `acquire`: the wait for a free slot plus any
    /// lazy connect. On expiry the acquire fails with `PoolError::Exhausted`.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// A bounded pool of reusable database connections.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    connector: Arc<dyn Connect>,
    options: PoolOptions,
    /// Idle connections, most recently returned last.
    idle: Mutex<Vec<Box<dyn Connection>>>,
    /// One permit per unit of capacity; each lease guard owns its permit.
    semaphore: Arc<Semaphore>,
    /// Open physical connections, leased and idle together.
    size: AtomicUsize,
    closed: AtomicBool,
}

impl Pool {
    /// Create a pool over the given backend. No connection is opened until
    /// the first acquire.
    pub fn new(connector: Arc<dyn Connect>, options: PoolOptions) -> Self {
        let capacity = options.max_connections;
        Self {
            inner: Arc::new(PoolInner {
                connector,
                options,
                idle: Mutex::new(Vec::with_capacity(capacity)),
                semaphore: Arc::new(Semaphore::new(capacity)),
                size: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Borrow a connection, waiting at most `acquire_timeout` in total for
    /// capacity and, when nothing idle survives, the lazy connect.
    ///
    /// The guard gives exclusive use of one connection and returns it to the
    /// pool when dropped, whether the caller succeeded, failed, or panicked.
    pub async fn acquire(&self) -> PoolResult<PooledConnection> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }

        // One deadline spans both the permit wait and the connect below.
        let started = Instant::now();
        let deadline = started + self.inner.options.acquire_timeout;

        let permit = timeout_at(
            deadline,
            Arc::clone(&self.inner.semaphore).acquire_owned(),
        )
        .await
        .map_err(|_| PoolError::Exhausted {
            waited: started.elapsed(),
        })?
        .map_err(|_| PoolError::Closed)?;

        // Prefer the most recently returned connection; discard stale ones.
        loop {
            let candidate = self.inner.idle.lock().pop();
            match candidate {
                Some(conn) if conn.is_open() => {
                    tracing::trace!("reusing idle connection");
                    return Ok(PooledConnection::new(conn, Arc::clone(&self.inner), permit));
                }
                Some(conn) => {
                    self.inner.size.fetch_sub(1, Ordering::AcqRel);
                    tracing::debug!("discarding stale idle connection");
                    drop(conn);
                }
                None => break,
            }
        }

        // Nothing idle: open a fresh connection under the permit we hold,
        // charged against the same deadline. On failure or expiry the permit
        // drops with this frame, freeing the slot.
        match timeout_at(deadline, self.inner.connector.connect()).await {
            Ok(Ok(conn)) => {
                self.inner.size.fetch_add(1, Ordering::AcqRel);
                tracing::debug!(total = self.size(), "opened new database connection");
                Ok(PooledConnection::new(conn, Arc::clone(&self.inner), permit))
            }
            Ok(Err(source)) => Err(PoolError::Connect(source)),
            Err(_) => Err(PoolError::Exhausted {
                waited: started.elapsed(),
            }),
        }
    }

    /// Acquire, run one statement, release. The connection goes back to the
    /// pool when this returns, on the error path included.
    pub async fn query(&self, sql: &str, params: &[Param]) -> PoolResult<Vec<Row>> {
        let mut conn = self.acquire().await?;
        conn.query(sql, params).await
    }

    /// Open physical connections, leased and idle together.
    pub fn size(&self) -> usize {
        self.inner.size.load(Ordering::Acquire)
    }

    /// Connections currently sitting idle in the pool.
    pub fn idle(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Connections currently leased out.
    pub fn in_use(&self) -> usize {
        self.size().saturating_sub(self.idle())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn options(&self) -> &PoolOptions {
        &self.inner.options
    }

    /// Close the pool: pending and future acquires fail with
    /// `PoolError::Closed` and the idle connections are dropped. Leased
    /// connections are discarded as their guards drop.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.semaphore.close();
        let drained: Vec<_> = self.inner.idle.lock().drain(..).collect();
        self.inner.size.fetch_sub(drained.len(), Ordering::AcqRel);
        drop(drained);
        tracing::info!("connection pool closed");
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("size", &self.size())
            .field("idle", &self.idle())
            .field("max_connections", &self.inner.options.max_connections)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// An exclusively leased connection.
///
/// Dropping the guard returns the connection to the idle set, or discards it
/// if the transport broke or the pool closed while it was out. The capacity
/// permit lives inside the guard, so each acquire frees its slot exactly
/// once, panic unwinds included.
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    fn new(conn: Box<dyn Connection>, pool: Arc<PoolInner>, permit: OwnedSemaphorePermit) -> Self {
        Self {
            conn: Some(conn),
            pool,
            _permit: permit,
        }
    }

    /// Run one statement on this connection.
    pub async fn query(&mut self, sql: &str, params: &[Param]) -> PoolResult<Vec<Row>> {
        self.conn_mut()
            .query(sql, params)
            .await
            .map_err(PoolError::Query)
    }

    /// Whether the underlying transport is still usable.
    pub fn is_open(&self) -> bool {
        self.conn.as_ref().map(|c| c.is_open()).unwrap_or(false)
    }

    /// Return the connection to the pool now instead of at end of scope.
    pub fn release(self) {}

    fn conn_mut(&mut self) -> &mut dyn Connection {
        // The slot is Some from construction until Drop takes it.
        self.conn
            .as_mut()
            .expect("BUG: connection used after return to pool")
            .as_mut()
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            // The closed flag is re-read under the idle lock: close() drains
            // under the same lock after setting the flag, so a return racing
            // close() either lands before the drain or sees the flag set.
            let mut idle = self.pool.idle.lock();
            if self.pool.closed.load(Ordering::Acquire) || !conn.is_open() {
                drop(idle);
                self.pool.size.fetch_sub(1, Ordering::AcqRel);
                tracing::trace!("discarding connection on release");
            } else {
                idle.push(conn);
                tracing::trace!("connection returned to pool");
            }
        }
        // The permit drops after this body, freeing the capacity slot only
        // once the connection is back in the idle set.
    }
}
