//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that feeds every request into the pipeline
//! - Wire up tower middleware (timeout, request ID, tracing)
//! - Convert each request into a `Context` and back into a response
//! - Serve on a listener until shutdown is signalled

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::pipeline::Pipeline;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::Context;
use crate::lifecycle::ShutdownSignal;

/// Application state injected into the catch-all handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub max_body_size: usize,
}

/// HTTP host for a dispatch pipeline.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server that runs `pipeline` for every request.
    pub fn new(config: AppConfig, pipeline: Pipeline) -> Self {
        let state = AppState {
            pipeline,
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_request))
            .route("/", any(dispatch_request))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Catch-all handler: run the pipeline on a fresh context.
async fn dispatch_request(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mut ctx = Context::from_request(request, state.max_body_size);

    tracing::debug!(
        request_id = ctx.request_id().unwrap_or("unknown"),
        method = %ctx.method(),
        path = %ctx.path(),
        "Dispatching request"
    );

    match state.pipeline.run(&mut ctx).await {
        Ok(()) => ctx.into_response(),
        Err(err) => err.into_response(),
    }
}
