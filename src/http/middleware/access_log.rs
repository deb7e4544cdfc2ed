//! Access log middleware.
//!
//! Logs one line per request once the rest of the pipeline has returned,
//! and records request metrics.

use std::time::Instant;

use crate::http::pipeline::{BoxFuture, HandlerResult, Middleware, Next};
use crate::http::Context;
use crate::observability::metrics;

/// Outermost middleware of the application pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl Middleware for AccessLog {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let start = Instant::now();
            let result = next.run(ctx).await;

            let status = match &result {
                Ok(()) => ctx.status(),
                Err(err) => err.status(),
            };
            let route = ctx.route().unwrap_or("none");

            if status.is_server_error() {
                tracing::error!(
                    request_id = ctx.request_id().unwrap_or("unknown"),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    status = status.as_u16(),
                    route = %route,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request completed"
                );
            } else {
                tracing::info!(
                    request_id = ctx.request_id().unwrap_or("unknown"),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    status = status.as_u16(),
                    route = %route,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request completed"
                );
            }

            metrics::record_request(ctx.method().as_str(), status.as_u16(), route, start);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::pipeline::Pipeline;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_passes_result_through() {
        let pipeline = Pipeline::builder().layer(AccessLog).build();

        let mut ctx = Context::new(Method::GET, "/missing");
        let err = pipeline.run(&mut ctx).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(ctx.path(), "/missing");
    }
}
