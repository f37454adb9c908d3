//! Route-level tests driven through the router, no socket.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use quarry_core::Engine;
use quarry_server::api::create_router;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = create_router(Engine::new()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_capability_listings() {
    let response = create_router(Engine::new())
        .oneshot(get("/connectors"))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "connectors": ["clickhouse", "databricks", "local", "postgres"] })
    );

    let response = create_router(Engine::new())
        .oneshot(get("/transforms"))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "transforms": ["moving_average", "normalize", "seasonal_adjustment"] })
    );
}

#[tokio::test]
async fn test_unknown_connector_maps_to_not_found() {
    let request = post_json(
        "/query",
        serde_json::json!({ "connector": "nope", "connector_config": {}, "query": {} }),
    );
    let response = create_router(Engine::new()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "QRY-1001");
}

#[tokio::test]
async fn test_unsupported_format_maps_to_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    let request = post_json(
        "/query",
        serde_json::json!({
            "connector": "local",
            "connector_config": { "path": path.to_str().unwrap() },
            "query": {},
        }),
    );
    let response = create_router(Engine::new()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transform_over_inline_data() {
    let request = post_json(
        "/transform",
        serde_json::json!({
            "input": { "data": [
                { "value": 10 },
                { "value": 20 },
                { "value": 30 },
            ]},
            "pipeline": [ { "name": "normalize", "params": { "columns": ["value"] } } ],
        }),
    );
    let response = create_router(Engine::new()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!([
            { "value": 0.0 },
            { "value": 0.5 },
            { "value": 1.0 },
        ])
    );
}

#[tokio::test]
async fn test_transform_without_input_is_bad_request() {
    let request = post_json(
        "/transform",
        serde_json::json!({ "input": {}, "pipeline": [] }),
    );
    let response = create_router(Engine::new()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_declarative_query_over_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("observations.csv");
    std::fs::write(&path, "date,series,value\n2024-01,GDP,100\n2024-02,CPI,3\n").unwrap();

    let request = post_json(
        "/declarative",
        serde_json::json!({
            "connector": "local",
            "connector_config": { "path": path.to_str().unwrap() },
            "expression": "SELECT date,value FROM anything WHERE date=2024-01",
        }),
    );
    let response = create_router(Engine::new()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!([{ "date": "2024-01", "value": 100 }]));
}
