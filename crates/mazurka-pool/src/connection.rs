//! Backend seam: what a database driver implements to live behind the pool.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::row::Row;

/// A single database connection as the pool sees it.
#[async_trait]
pub trait Connection: Send {
    /// Execute one statement and collect all result rows in order.
    async fn query(&mut self, sql: &str, params: &[Param]) -> Result<Vec<Row>, BackendError>;

    /// Whether the transport is still usable. Connections reporting `false`
    /// are discarded instead of returning to the idle set.
    fn is_open(&self) -> bool;
}

/// Opens new physical connections on behalf of the pool.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>, BackendError>;
}

/// A query parameter, limited to the scalar types the service binds.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Param::Int(v.into())
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Float(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}
