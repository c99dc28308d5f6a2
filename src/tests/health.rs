use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::Service;

use crate::tests::helper;

#[tokio::test]
async fn test_health() {
    let mut app = helper::setup_test_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(StatusCode::OK, response.status());

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice::<Value>(&body[..]).unwrap();

    assert_eq!(Some("Server is running"), value["status"].as_str());
    assert!(value["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let mut app = helper::setup_test_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    // no Authorization header on the request
    assert_eq!(StatusCode::OK, response.status());
}
