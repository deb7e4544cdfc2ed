//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → ShutdownSignal resolves → server stops accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup in `main`: config, logging, routes, then listener
//! - Ordered shutdown: stop accept, drain in-flight requests, return

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::shutdown_signal;
