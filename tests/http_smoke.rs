mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{read_json, test_state};
use taine_api::app::build_router;
use tower::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn health_reports_ok() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app.oneshot(get("/api/health")).await.expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn system_info_reports_backend_capabilities() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app.oneshot(get("/api/system/info")).await.expect("info");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["api_version"], "v1");
    assert_eq!(payload["storage_backend"], "memory");
    assert_eq!(payload["durable"], false);
}

#[tokio::test]
async fn tweet_listing_is_open_without_credentials() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app.oneshot(get("/api/test/tweets")).await.expect("tweets");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (state, _) = test_state();
    let app = build_router(state);

    let response = app
        .oneshot(get("/api/openapi.json"))
        .await
        .expect("openapi");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["info"]["title"], "taine-api");
    assert!(payload["paths"].get("/api/v1/wishes").is_some());
}
