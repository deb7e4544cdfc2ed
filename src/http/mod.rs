//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, request ID, tracing)
//!     → context.rs (request becomes a Context)
//!     → pipeline.rs (middleware chain, e.g. access log)
//!     → [routing::Dispatcher picks a route] → handler or mount.rs
//!     → response.rs (Context or HandlerError becomes a Response)
//!     → Send to client
//! ```

pub mod context;
pub mod middleware;
pub mod mount;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use context::{BodyError, Context, RequestBody, ResponseBody};
pub use mount::Mount;
pub use pipeline::{
    endpoint_fn, middleware_fn, BoxFuture, Endpoint, HandlerResult, Middleware, Next, Pipeline,
    PipelineBuilder,
};
pub use request::X_REQUEST_ID;
pub use response::HandlerError;
pub use server::HttpServer;
