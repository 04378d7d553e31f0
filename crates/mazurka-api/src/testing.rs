use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use serde_json::json;
use tokio::net::TcpListener;

use mazurka_pool::{MockConnector, Pool, Row};

use crate::App;
use crate::config::Config;
use crate::controllers::AppState;

/// A test application builder for integration testing.
///
/// Serves the real router on an OS-assigned port, backed by the in-memory
/// connector so tests never need a database server.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_users() {
///     let app = TestApp::new().await;
///     let res = app.client.get(&app.url("/users")).await;
///     assert_eq!(res.status, 200);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub pool: Pool,
    pub connector: MockConnector,
    pub config: Config,
}

impl TestApp {
    /// Create a test app whose users table holds [`TestApp::sample_users`].
    pub async fn new() -> Self {
        Self::with_connector(MockConnector::with_rows(Self::sample_users())).await
    }

    /// Create a test app over a prepared connector. Flip the connector's
    /// switches through `app.connector` to drive failure scenarios.
    pub async fn with_connector(connector: MockConnector) -> Self {
        Self::build(connector, Vec::new()).await
    }

    /// Create a test app with extra routes merged in before middleware,
    /// e.g. a deliberately panicking handler.
    pub async fn with_routes(routes: Router<AppState>) -> Self {
        Self::build(MockConnector::with_rows(Self::sample_users()), vec![routes]).await
    }

    async fn build(connector: MockConnector, routes: Vec<Router<AppState>>) -> Self {
        let config = Self::test_config();
        let pool = Pool::new(Arc::new(connector.clone()), config.pool_options());

        let mut app = App::with_pool(config.clone(), pool.clone());
        for router in routes {
            app = app.routes(router);
        }
        let router = app.router();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            pool,
            connector,
            config,
        }
    }

    /// Test configuration: random port, small pool, short acquire timeout.
    pub fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0, // OS assigns a random port
            database_url: "postgres://unused".to_string(),
            pool_max_connections: 5,
            pool_acquire_timeout_ms: 500,
            environment: "test".to_string(),
        }
    }

    /// Fixture rows for the users table.
    pub fn sample_users() -> Vec<Row> {
        vec![
            Row::from_pairs([
                ("id", json!(1)),
                ("name", json!("Ada Lovelace")),
                ("email", json!("ada@example.com")),
            ]),
            Row::from_pairs([
                ("id", json!(2)),
                ("name", json!("Grace Hopper")),
                ("email", json!("grace@example.com")),
            ]),
        ]
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// A simple HTTP test client with helper methods.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address.
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .get(url)
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with one extra header.
    pub async fn get_with_header(&self, url: &str, name: &str, value: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .get(url)
            .header(name, value)
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
    pub headers: HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// The Content-Type header, or empty if absent.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}
