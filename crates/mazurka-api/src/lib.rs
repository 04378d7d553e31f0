//! # mazurka-api
//!
//! The mazurka backend: a small HTTP service over a pooled PostgreSQL
//! database.
//!
//! Three routes: `/health` answers without touching the database, `/`
//! greets, `/users` returns the users table as JSON. Requests borrow a
//! connection from [`mazurka_pool`] for the duration of one query and the
//! pool takes it back on every exit path.

pub mod app;
pub mod config;
pub mod controllers;
pub mod error;
pub mod logging;
pub mod probe;
pub mod testing;

pub use app::App;
pub use config::Config;
pub use error::{ApiError, ErrorBody};
pub use testing::{TestApp, TestClient, TestResponse};
