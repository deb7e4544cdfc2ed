//! Version sub-application.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::http::{BoxFuture, Context, HandlerResult, Middleware, Next, Pipeline};
use crate::services::VersionSource;

/// Terminal middleware writing the build version as plain text.
pub struct VersionMiddleware {
    source: Arc<dyn VersionSource>,
}

impl VersionMiddleware {
    pub fn new(source: Arc<dyn VersionSource>) -> Self {
        Self { source }
    }
}

impl Middleware for VersionMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            ctx.set_status(StatusCode::OK);
            ctx.write_text(self.source.version());
            Ok(())
        })
    }
}

pub fn pipeline(source: Arc<dyn VersionSource>) -> Pipeline {
    Pipeline::builder()
        .layer(VersionMiddleware::new(source))
        .build()
}
