//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     template string
//!     → pattern.rs (compile into literal / parameter / wildcard segments)
//!     → router.rs (append to table; order = priority)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path):
//!     → router.rs (scan routes in registration order)
//!     → pattern.rs (structural match + constraint checks)
//!     → Return: matched Route + params, or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment-wise comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod pattern;
pub mod router;

pub use pattern::{Constraint, Params, Pattern, PatternError, Segment};
pub use router::{
    ConfigError, Dispatcher, MethodFilter, NotFound, Route, RouteError, RouteMatch, RouteTable,
    RouteTableBuilder,
};
