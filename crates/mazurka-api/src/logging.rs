//! Logging and tracing initialization.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mazurka_api::App;
//! use mazurka_api::logging::init_logging;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize logging - call this BEFORE creating the App
//!     init_logging();
//!
//!     let app = App::new();
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! The log level is controlled via the `RUST_LOG` environment variable:
//!
//! ```bash
//! # Show request traces and pool activity
//! RUST_LOG=debug cargo run
//!
//! # Only warnings and errors (production)
//! RUST_LOG=warn cargo run
//!
//! # Fine-grained control
//! RUST_LOG=mazurka_api=debug,mazurka_pool=trace,tower_http=debug cargo run
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with sensible defaults.
///
/// Call once at application startup, before creating the `App`. The level
/// comes from `RUST_LOG` and defaults to `info`.
///
/// # Panics
///
/// Panics if a global subscriber is already set.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging for log aggregation systems.
///
/// # Panics
///
/// Panics if a global subscriber is already set.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
