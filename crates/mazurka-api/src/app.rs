//! Application builder: wires config, pool, routes, and middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use mazurka_pool::{PgConnector, Pool};

use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::probe;

/// The assembled service: configuration plus the connection pool handlers
/// borrow from.
pub struct App {
    pub config: Config,
    pub pool: Pool,
    custom_routes: Vec<Router<AppState>>,
}

impl App {
    /// Build the application from environment variables.
    ///
    /// The pool opens connections lazily, so construction succeeds even
    /// while the database is unreachable; the startup probe fires in the
    /// background and reports reachability in the log.
    ///
    /// Must be called from within the tokio runtime.
    pub fn new() -> Self {
        let config = Config::from_env();
        let connector = Arc::new(PgConnector::new(config.database_url.clone()));
        let pool = Pool::new(connector, config.pool_options());
        probe::spawn(pool.clone());

        Self {
            config,
            pool,
            custom_routes: Vec::new(),
        }
    }

    /// Build the application over an injected pool.
    ///
    /// This is the seam tests use to swap the backend; no startup probe is
    /// spawned, the pool's owner decides whether to probe.
    pub fn with_pool(config: Config, pool: Pool) -> Self {
        Self {
            config,
            pool,
            custom_routes: Vec::new(),
        }
    }

    /// Merge additional routes sharing `AppState`, before middleware is
    /// applied.
    pub fn routes(mut self, router: Router<AppState>) -> Self {
        self.custom_routes.push(router);
        self
    }

    /// Build the axum router: application routes, then CORS, then the
    /// development-only request tracing, then the terminal panic handler
    /// as the outermost layer.
    pub fn router(&self) -> Router {
        let is_dev = self.config.is_dev();

        let state = AppState {
            pool: self.pool.clone(),
            config: Arc::new(self.config.clone()),
        };

        let mut router = controllers::routes().with_state(state.clone());

        for custom in &self.custom_routes {
            router = router.merge(custom.clone().with_state(state.clone()));
        }

        router = router.layer(CorsLayer::permissive());

        // Only add the tracing/request-id middleware in development mode.
        if is_dev {
            use tower_http::LatencyUnit;
            use tower_http::trace::DefaultMakeSpan;
            use tower_http::trace::DefaultOnRequest;
            use tower_http::trace::DefaultOnResponse;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router.layer(CatchPanicLayer::custom(handle_panic))
    }

    /// Bind the configured address and serve until Ctrl-C, then close the
    /// pool once in-flight requests have drained.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("mazurka server running on http://{}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.pool.close();
        Ok(())
    }
}

/// Terminal handler: a panicking request becomes a plain 500 instead of a
/// dropped connection.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("handler panicked: {}", detail);

    (StatusCode::INTERNAL_SERVER_ERROR, "Something broke!").into_response()
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down mazurka server...");
}
