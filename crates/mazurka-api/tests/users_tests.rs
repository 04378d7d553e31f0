use mazurka_api::TestApp;
use mazurka_pool::{MockConnector, Row};
use serde_json::json;

// ═══ Happy path ═══

#[tokio::test]
async fn test_list_users_returns_all_rows() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/users")).await;

    assert_eq!(res.status, 200);
    assert!(res.content_type().starts_with("application/json"));

    let body = res.json();
    let users = body.as_array().expect("expected a JSON array");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], json!("Ada Lovelace"));
    assert_eq!(users[1]["email"], json!("grace@example.com"));
}

#[tokio::test]
async fn test_list_users_empty_table_is_empty_array() {
    let app = TestApp::with_connector(MockConnector::new()).await;

    let res = app.client.get(&app.url("/users")).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, "[]");
}

#[tokio::test]
async fn test_list_users_reflects_table_shape_at_query_time() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/users")).await;
    assert_eq!(res.json()[0]["nickname"], json!(null));

    // The handler makes no assumption about the column set; a migration
    // between requests shows up in the next response.
    app.connector.set_rows(vec![Row::from_pairs([
        ("id", json!(1)),
        ("name", json!("Ada Lovelace")),
        ("nickname", json!("ada")),
    ])]);

    let res = app.client.get(&app.url("/users")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()[0]["nickname"], json!("ada"));
}

// ═══ Failure paths ═══

#[tokio::test]
async fn test_query_failure_is_an_opaque_500() {
    let app = TestApp::new().await;
    app.connector.fail_queries(true);

    let res = app.client.get(&app.url("/users")).await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body, r#"{"error":"Internal server error"}"#);
}

#[tokio::test]
async fn test_connect_failure_is_an_opaque_500() {
    let connector = MockConnector::new();
    connector.fail_connections(true);
    let app = TestApp::with_connector(connector).await;

    let res = app.client.get(&app.url("/users")).await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body, r#"{"error":"Internal server error"}"#);
}

#[tokio::test]
async fn test_failed_request_still_returns_connection_to_pool() {
    let app = TestApp::new().await;

    // Warm one connection.
    let res = app.client.get(&app.url("/users")).await;
    assert_eq!(res.status, 200);
    assert_eq!(app.pool.idle(), 1);

    app.connector.fail_queries(true);
    let res = app.client.get(&app.url("/users")).await;
    assert_eq!(res.status, 500);
    assert_eq!(app.pool.idle(), 1);
    assert_eq!(app.pool.in_use(), 0);

    // And the same connection serves again once the failure clears.
    app.connector.fail_queries(false);
    let res = app.client.get(&app.url("/users")).await;
    assert_eq!(res.status, 200);
    assert_eq!(app.connector.connects(), 1);
}

#[tokio::test]
async fn test_exhausted_pool_is_an_opaque_500() {
    let app = TestApp::new().await;

    // Hold every slot so the request's acquire runs out its budget.
    let mut guards = Vec::new();
    for _ in 0..app.config.pool_max_connections {
        guards.push(app.pool.acquire().await.unwrap());
    }

    let res = app.client.get(&app.url("/users")).await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body, r#"{"error":"Internal server error"}"#);
    drop(guards);
}

// ═══ Pool behavior under request load ═══

#[tokio::test]
async fn test_sequential_requests_reuse_one_connection() {
    let app = TestApp::new().await;

    for _ in 0..10 {
        let res = app.client.get(&app.url("/users")).await;
        assert_eq!(res.status, 200);
    }

    assert_eq!(app.connector.connects(), 1);
    assert_eq!(app.pool.size(), 1);
    assert_eq!(app.pool.idle(), 1);
}

#[tokio::test]
async fn test_idle_count_returns_to_its_pre_burst_value() {
    let app = TestApp::new().await;

    // Warm the pool to full capacity so the burst cannot grow it.
    let mut guards = Vec::new();
    for _ in 0..app.config.pool_max_connections {
        guards.push(app.pool.acquire().await.unwrap());
    }
    drop(guards);
    let baseline = app.pool.idle();
    assert_eq!(baseline, app.config.pool_max_connections);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let client = app.client.clone();
        let url = app.url("/users");
        tasks.spawn(async move { client.get(&url).await });
    }
    while let Some(res) = tasks.join_next().await {
        assert_eq!(res.unwrap().status, 200);
    }

    assert_eq!(app.pool.idle(), baseline);
    assert_eq!(app.pool.in_use(), 0);
}

#[tokio::test]
async fn test_fifty_concurrent_requests_leak_nothing() {
    let app = TestApp::new().await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..50 {
        let client = app.client.clone();
        let url = app.url("/users");
        tasks.spawn(async move { client.get(&url).await });
    }
    while let Some(res) = tasks.join_next().await {
        let res = res.unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.json().as_array().unwrap().len(), 2);
    }

    // Every borrowed connection is back; the pool never grew past its cap.
    assert_eq!(app.pool.in_use(), 0);
    assert_eq!(app.pool.idle(), app.pool.size());
    assert!(app.pool.size() <= app.config.pool_max_connections);
}
