//! Route table, registration and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up the first route matching a method and path
//! - Return the matched route with its params, or an explicit `NotFound`
//! - Bridge the table into a pipeline as a terminal handler (`Dispatcher`)
//!
//! # Design Decisions
//! - Immutable after `build()` (shared via `Arc`, no locks on the hot path)
//! - O(n) scan in registration order; first match wins
//! - No specificity scoring: register static routes before broad mounts,
//!   otherwise the mount shadows them
//! - Explicit NotFound rather than a silent default

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::http::mount::Mount;
use crate::http::pipeline::{BoxFuture, Endpoint, HandlerResult, Pipeline};
use crate::http::response::HandlerError;
use crate::http::Context;
use crate::routing::pattern::{Params, Pattern, PatternError};

/// Startup wiring errors that are not about template syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("mount prefix `{0}` must start with `/`")]
    InvalidMountPrefix(String),

    /// A collaborator a route depends on was never provided.
    #[error("required service `{0}` was not provided")]
    MissingService(&'static str),
}

/// Error type of the route table builder.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// No registered route accepts the method and path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route matches {method} {path}")]
pub struct NotFound {
    pub method: Method,
    pub path: String,
}

/// Which HTTP methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Method),
}

impl MethodFilter {
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(expected) => expected == method,
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        MethodFilter::Only(method)
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("*"),
            MethodFilter::Only(method) => write!(f, "{}", method),
        }
    }
}

/// A (pattern, method filter, handler) binding.
pub struct Route {
    name: Arc<str>,
    pattern: Pattern,
    methods: MethodFilter,
    handler: Arc<dyn Endpoint>,
}

impl Route {
    /// Display name used in logs and metrics labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn methods(&self) -> &MethodFilter {
        &self.methods
    }

    pub fn handler(&self) -> &Arc<dyn Endpoint> {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern.template())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Params,
}

/// Ordered, immutable collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Find the first route, in registration order, accepting `method` and `path`.
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<RouteMatch<'_>, NotFound> {
        self.routes
            .iter()
            .filter(|route| route.methods.accepts(method))
            .find_map(|route| {
                route
                    .pattern
                    .matches(path)
                    .map(|params| RouteMatch { route, params })
            })
            .ok_or_else(|| NotFound {
                method: method.clone(),
                path: path.to_string(),
            })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builds a [`RouteTable`]. Registration order is match priority.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    /// Append a route named after its method filter and template.
    pub fn register(
        self,
        methods: impl Into<MethodFilter>,
        template: &str,
        handler: impl Endpoint,
    ) -> Result<Self, RouteError> {
        let methods = methods.into();
        let name = format!("{} {}", methods, template);
        self.register_named(name, methods, template, handler)
    }

    /// Append a route with an explicit display name.
    pub fn register_named(
        mut self,
        name: impl Into<String>,
        methods: impl Into<MethodFilter>,
        template: &str,
        handler: impl Endpoint,
    ) -> Result<Self, RouteError> {
        let pattern = Pattern::compile(template)?;
        let route = Route {
            name: Arc::from(name.into()),
            pattern,
            methods: methods.into(),
            handler: Arc::new(handler),
        };

        tracing::debug!(
            route = %route.name,
            priority = self.routes.len(),
            "Route registered"
        );

        self.routes.push(route);
        Ok(self)
    }

    pub fn get(self, template: &str, handler: impl Endpoint) -> Result<Self, RouteError> {
        self.register(Method::GET, template, handler)
    }

    pub fn post(self, template: &str, handler: impl Endpoint) -> Result<Self, RouteError> {
        self.register(Method::POST, template, handler)
    }

    pub fn put(self, template: &str, handler: impl Endpoint) -> Result<Self, RouteError> {
        self.register(Method::PUT, template, handler)
    }

    pub fn delete(self, template: &str, handler: impl Endpoint) -> Result<Self, RouteError> {
        self.register(Method::DELETE, template, handler)
    }

    /// Route accepting every method.
    pub fn map(self, template: &str, handler: impl Endpoint) -> Result<Self, RouteError> {
        self.register(MethodFilter::Any, template, handler)
    }

    /// Mount `pipeline` under `prefix`, for every method.
    ///
    /// The nested pipeline sees the path with `prefix` stripped.
    pub fn mount(self, prefix: &str, pipeline: Pipeline) -> Result<Self, RouteError> {
        let name = format!("mount {}", prefix);
        self.mount_named(name, prefix, pipeline)
    }

    pub fn mount_named(
        self,
        name: impl Into<String>,
        prefix: &str,
        pipeline: Pipeline,
    ) -> Result<Self, RouteError> {
        let mount = Mount::new(prefix, pipeline)?;
        let template = mount.template();
        self.register_named(name, MethodFilter::Any, &template, mount)
    }

    pub fn build(self) -> RouteTable {
        tracing::info!(routes = self.routes.len(), "Route table built");
        RouteTable {
            routes: self.routes,
        }
    }
}

/// Terminal handler that routes a [`Context`] through a [`RouteTable`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

impl Endpoint for Dispatcher {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let RouteMatch { route, params } = match self.table.dispatch(ctx.method(), ctx.path()) {
                Ok(found) => found,
                Err(not_found) => {
                    tracing::debug!(
                        method = %not_found.method,
                        path = %not_found.path,
                        "No route matched"
                    );
                    return Err(HandlerError::NotFound(not_found));
                }
            };

            tracing::trace!(route = %route.name(), "Route matched");
            ctx.replace_params(params);
            ctx.set_route(Arc::clone(&route.name));
            route.handler.call(ctx).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::pipeline::endpoint_fn;

    fn ok(ctx: &mut Context) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move {
            ctx.write_text("ok");
            Ok(())
        })
    }

    struct Reply(&'static str);

    impl Endpoint for Reply {
        fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                ctx.write_text(self.0);
                Ok(())
            })
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let table = RouteTable::builder()
            .get("/items/{id}", Reply("param"))
            .unwrap()
            .get("/items/{id:int}", Reply("typed"))
            .unwrap()
            .build();

        let found = table.dispatch(&Method::GET, "/items/7").unwrap();
        assert_eq!(found.route.name(), "GET /items/{id}");
        assert_eq!(found.params.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_constraint_failure_falls_through() {
        let table = RouteTable::builder()
            .get("/items/{id:int}", Reply("typed"))
            .unwrap()
            .get("/items/{slug}", Reply("slug"))
            .unwrap()
            .build();

        let found = table.dispatch(&Method::GET, "/items/abc").unwrap();
        assert_eq!(found.route.name(), "GET /items/{slug}");
    }

    #[test]
    fn test_method_filter() {
        let table = RouteTable::builder()
            .post("B", endpoint_fn(ok))
            .unwrap()
            .map("/any", endpoint_fn(ok))
            .unwrap()
            .build();

        assert!(table.dispatch(&Method::POST, "/B").is_ok());
        assert_eq!(
            table.dispatch(&Method::GET, "/B").unwrap_err(),
            NotFound {
                method: Method::GET,
                path: "/B".into()
            }
        );
        assert!(table.dispatch(&Method::DELETE, "/any").is_ok());
        assert!(table.dispatch(&Method::PATCH, "/any").is_ok());
    }

    #[test]
    fn test_mount_shadows_later_routes() {
        let table = RouteTable::builder()
            .mount("/api", Pipeline::builder().endpoint(Reply("mounted")).build())
            .unwrap()
            .get("/api/health", Reply("health"))
            .unwrap()
            .build();

        let found = table.dispatch(&Method::GET, "/api/health").unwrap();
        assert_eq!(found.route.name(), "mount /api");
        assert_eq!(found.params.get("path").map(String::as_str), Some("health"));
    }

    #[test]
    fn test_registration_errors() {
        let err = RouteTable::builder()
            .mount("dashboard", Pipeline::builder().build())
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::Config(ConfigError::InvalidMountPrefix(ref p)) if p == "dashboard"
        ));

        let err = RouteTable::builder()
            .get("/{**rest}/tail", endpoint_fn(ok))
            .unwrap_err();
        assert!(matches!(err, RouteError::Pattern(PatternError::WildcardNotLast { .. })));
    }

    #[tokio::test]
    async fn test_dispatcher_populates_context() {
        let dispatcher = Dispatcher::new(
            RouteTable::builder()
                .get("/customers/{id:int}", endpoint_fn(ok))
                .unwrap()
                .build(),
        );

        let mut ctx = Context::new(Method::GET, "/customers/12");
        dispatcher.call(&mut ctx).await.unwrap();
        assert_eq!(ctx.param("id"), Some("12"));
        assert_eq!(ctx.route(), Some("GET /customers/{id:int}"));
        assert_eq!(ctx.output().as_bytes(), b"ok");

        let mut ctx = Context::new(Method::GET, "/customers/x");
        let err = dispatcher.call(&mut ctx).await.unwrap_err();
        assert!(matches!(err, HandlerError::NotFound(_)));
    }
}
