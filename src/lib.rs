//! HTTP request dispatch core.
//!
//! Route patterns with typed parameters and greedy wildcards, an ordered
//! route table, middleware pipelines with short-circuit, and mounted
//! sub-pipelines with path-base stripping. Served through axum.

pub mod app;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod services;

pub use config::AppConfig;
pub use http::{Context, HttpServer, Pipeline};
pub use lifecycle::Shutdown;
pub use routing::{Pattern, RouteTable};
pub use services::Services;
