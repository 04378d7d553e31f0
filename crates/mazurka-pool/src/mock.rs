//! In-memory backend for tests.
//!
//! `MockConnector` mirrors the production backend's observable behavior
//! without a server: a settable row set answers every query, and switches
//! simulate the failure modes (refused connects, failing statements, slow
//! connects, severed transports). Connectors are cheap to clone and clones
//! share state, so a test can keep one handle and flip switches mid-flight.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::connection::{Connect, Connection, Param};
use crate::error::BackendError;
use crate::row::Row;

#[derive(Clone, Default)]
pub struct MockConnector {
    shared: Arc<MockShared>,
}

#[derive(Default)]
struct MockShared {
    rows: Mutex<Vec<Row>>,
    fail_connect: AtomicBool,
    fail_query: AtomicBool,
    connect_delay: Mutex<Option<Duration>>,
    /// Bumping the epoch severs every connection opened before the bump.
    epoch: AtomicUsize,
    connects: AtomicUsize,
    queries: AtomicUsize,
}

impl MockConnector {
    /// A connector whose queries return no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose queries return the given rows.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        let connector = Self::default();
        connector.set_rows(rows);
        connector
    }

    /// Replace the row set answered by subsequent queries.
    pub fn set_rows(&self, rows: Vec<Row>) {
        *self.shared.rows.lock() = rows;
    }

    /// Make subsequent connects fail with a refused-connection error.
    pub fn fail_connections(&self, fail: bool) {
        self.shared.fail_connect.store(fail, Ordering::Release);
    }

    /// Make subsequent queries fail with a reset-connection error. The
    /// transport stays open; a failing statement is not a broken socket.
    pub fn fail_queries(&self, fail: bool) {
        self.shared.fail_query.store(fail, Ordering::Release);
    }

    /// Delay subsequent connects, simulating a slow or unreachable server.
    pub fn delay_connections(&self, delay: Duration) {
        *self.shared.connect_delay.lock() = Some(delay);
    }

    /// Sever every outstanding connection, as a server restart would.
    /// Connections opened after the bounce are healthy.
    pub fn bounce(&self) {
        self.shared.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Physical connections successfully opened so far.
    pub fn connects(&self) -> usize {
        self.shared.connects.load(Ordering::Acquire)
    }

    /// Statements executed so far, failed ones included.
    pub fn queries(&self) -> usize {
        self.shared.queries.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Connect for MockConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, BackendError> {
        let delay = *self.shared.connect_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.shared.fail_connect.load(Ordering::Acquire) {
            return Err(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "simulated connection failure",
            )));
        }
        self.shared.connects.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(MockConnection {
            shared: Arc::clone(&self.shared),
            epoch: self.shared.epoch.load(Ordering::Acquire),
        }))
    }
}

struct MockConnection {
    shared: Arc<MockShared>,
    epoch: usize,
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(&mut self, _sql: &str, _params: &[Param]) -> Result<Vec<Row>, BackendError> {
        self.shared.queries.fetch_add(1, Ordering::AcqRel);
        if self.shared.fail_query.load(Ordering::Acquire) {
            return Err(Box::new(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "simulated query failure",
            )));
        }
        Ok(self.shared.rows.lock().clone())
    }

    fn is_open(&self) -> bool {
        self.epoch == self.shared.epoch.load(Ordering::Acquire)
    }
}
