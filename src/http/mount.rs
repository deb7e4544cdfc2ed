//! Sub-pipelines mounted under a path prefix.
//!
//! # Responsibilities
//! - Register a nested pipeline as `prefix/{**path}` in a route table
//! - Strip the prefix from the path seen by the nested pipeline
//! - Restore path, path base, params and route once the nested pipeline returns
//!
//! # Design Decisions
//! - Restoration happens on success and on error, so outer middleware
//!   always observe the original request
//! - Nested pipeline starts with empty params; the tail is its path

use crate::http::pipeline::{BoxFuture, Endpoint, HandlerResult, Pipeline};
use crate::http::Context;
use crate::routing::pattern::Params;
use crate::routing::router::ConfigError;

/// Name of the wildcard capturing the remainder below a mount prefix.
pub const TAIL_PARAM: &str = "path";

/// A pipeline bound under a path prefix.
#[derive(Debug, Clone)]
pub struct Mount {
    prefix: String,
    pipeline: Pipeline,
}

impl Mount {
    /// `prefix` must start with `/`. A trailing `/` is ignored.
    pub fn new(prefix: &str, pipeline: Pipeline) -> Result<Self, ConfigError> {
        if !prefix.starts_with('/') {
            return Err(ConfigError::InvalidMountPrefix(prefix.to_string()));
        }

        Ok(Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            pipeline,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Route template this mount is registered under.
    pub fn template(&self) -> String {
        format!("{}/{{**{}}}", self.prefix, TAIL_PARAM)
    }
}

impl Endpoint for Mount {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let tail = format!("/{}", ctx.param(TAIL_PARAM).unwrap_or_default());
            let nested_base = format!("{}{}", ctx.path_base(), self.prefix);

            let path = ctx.replace_path(tail);
            let path_base = ctx.replace_path_base(nested_base);
            let params = ctx.replace_params(Params::new());

            tracing::trace!(
                prefix = %self.prefix,
                path = %ctx.path(),
                "Entering mount"
            );

            let route = ctx.route_handle();
            let result = self.pipeline.run(ctx).await;

            ctx.replace_path(path);
            ctx.replace_path_base(path_base);
            ctx.replace_params(params);
            ctx.replace_route(route);

            result
        })
    }
}
