//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use tower::ServiceExt;

use route_dispatch::app::build_pipeline;
use route_dispatch::{AppConfig, HttpServer, Services};

/// Fully layered router for the reference application.
pub fn app_router(config: AppConfig) -> Router {
    let services = Services::standard(&config);
    let pipeline = build_pipeline(&config, &services).unwrap();
    HttpServer::new(config, pipeline).router()
}

/// Drive one request through `router` in process.
pub async fn send(router: &Router, method: Method, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
