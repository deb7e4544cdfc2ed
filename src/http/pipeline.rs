//! Middleware pipeline.
//!
//! # Responsibilities
//! - Compose an ordered list of middleware around one terminal endpoint
//! - Let each middleware run logic before and after the rest of the chain
//! - Let a middleware short-circuit by not calling `next`
//!
//! # Design Decisions
//! - Built once at startup, shared read-only across requests (`Arc`)
//! - Continuation is an explicit `Next` value, not a captured closure
//! - A pipeline is itself an `Endpoint`, so pipelines nest (see `mount.rs`)
//! - No endpoint configured means 404, like an empty application builder

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http::response::HandlerError;
use crate::http::Context;
use crate::routing::router::NotFound;

/// Boxed future returned by middleware and endpoints.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type HandlerResult = Result<(), HandlerError>;

/// A terminal request handler.
pub trait Endpoint: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult>;
}

/// A unit wrapping the rest of the pipeline.
pub trait Middleware: Send + Sync + 'static {
    /// Handle the request. Call `next.run(ctx)` to delegate; skip it to short-circuit.
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult>;
}

/// The remainder of a pipeline from the current middleware onwards.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Run the rest of the chain, then the endpoint.
    pub fn run<'c>(self, ctx: &'c mut Context) -> BoxFuture<'c, HandlerResult>
    where
        'a: 'c,
    {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(
                ctx,
                Next {
                    chain: rest,
                    endpoint: self.endpoint,
                },
            ),
            None => self.endpoint.call(ctx),
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .finish_non_exhaustive()
    }
}

/// An immutable chain of middleware ending in an endpoint.
#[derive(Clone)]
pub struct Pipeline {
    middleware: Arc<[Arc<dyn Middleware>]>,
    endpoint: Arc<dyn Endpoint>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn run<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        Next {
            chain: &self.middleware,
            endpoint: self.endpoint.as_ref(),
        }
        .run(ctx)
    }

    /// Number of middleware in front of the endpoint.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl Endpoint for Pipeline {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        self.run(ctx)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Builds a [`Pipeline`]. Middleware run in the order they are added.
#[derive(Default)]
pub struct PipelineBuilder {
    middleware: Vec<Arc<dyn Middleware>>,
    endpoint: Option<Arc<dyn Endpoint>>,
}

impl PipelineBuilder {
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Set the terminal endpoint. A later call replaces an earlier one.
    pub fn endpoint(mut self, endpoint: impl Endpoint) -> Self {
        self.endpoint = Some(Arc::new(endpoint));
        self
    }

    pub fn build(self) -> Pipeline {
        let endpoint: Arc<dyn Endpoint> = match self.endpoint {
            Some(endpoint) => endpoint,
            None => Arc::new(NotFoundEndpoint),
        };
        Pipeline {
            middleware: Arc::from(self.middleware),
            endpoint,
        }
    }
}

/// Terminal endpoint of a pipeline with nothing else at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundEndpoint;

impl Endpoint for NotFoundEndpoint {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        let not_found = NotFound {
            method: ctx.method().clone(),
            path: ctx.path().to_string(),
        };
        Box::pin(async move { Err(HandlerError::NotFound(not_found)) })
    }
}

/// Endpoint backed by a plain function.
#[derive(Clone, Copy)]
pub struct EndpointFn<F>(F);

pub fn endpoint_fn<F>(f: F) -> EndpointFn<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    EndpointFn(f)
}

impl<F> Endpoint for EndpointFn<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        (self.0)(ctx)
    }
}

/// Middleware backed by a plain function.
#[derive(Clone, Copy)]
pub struct MiddlewareFn<F>(F);

pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    MiddlewareFn(f)
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        (self.0)(ctx, next)
    }
}
