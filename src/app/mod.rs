//! Reference application.
//!
//! # Route Table (registration order = priority)
//! ```text
//! any   /mydashboard/{**path}   mount → dashboard pipeline
//! any   /version/{**path}       mount → version pipeline ("Version number")
//! GET   /                       hello
//! GET   /customers/{id:int}     customer lookup (JSON)
//! POST  A                       customer echo (JSON, 201)
//! POST  B                       raw body echo
//! ```
//!
//! Mount prefixes and the dashboard title come from config.

pub mod dashboard;
pub mod handlers;
pub mod version;

use crate::config::AppConfig;
use crate::http::middleware::AccessLog;
use crate::http::{endpoint_fn, Pipeline};
use crate::routing::{Dispatcher, RouteError, RouteTable};
use crate::services::Services;

use self::dashboard::DashboardOptions;
use self::handlers::GetCustomer;

/// Build the route table. Fails if a route's collaborator is missing.
pub fn build_routes(config: &AppConfig, services: &Services) -> Result<RouteTable, RouteError> {
    let options = DashboardOptions {
        title: config.dashboard.title.clone(),
    };

    let table = RouteTable::builder()
        .mount(
            &config.dashboard.prefix,
            dashboard::pipeline(options, services.content()?),
        )?
        .mount_named(
            "Version number",
            &config.version.prefix,
            version::pipeline(services.version()?),
        )?
        .get("/", endpoint_fn(handlers::hello))?
        .get("/customers/{id:int}", GetCustomer::new(services.customers()?))?
        .post("A", endpoint_fn(handlers::create_customer))?
        .post("B", endpoint_fn(handlers::echo_body))?
        .build();

    Ok(table)
}

/// Access log in front of the dispatcher.
pub fn build_pipeline(config: &AppConfig, services: &Services) -> Result<Pipeline, RouteError> {
    let table = build_routes(config, services)?;
    Ok(Pipeline::builder()
        .layer(AccessLog)
        .endpoint(Dispatcher::new(table))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::ConfigError;
    use crate::services::{FakeCustomerRepository, PackageVersion};
    use axum::http::Method;

    #[test]
    fn test_registration_order() {
        let config = AppConfig::default();
        let table = build_routes(&config, &Services::standard(&config)).unwrap();
        let names: Vec<&str> = table.routes().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            [
                "mount /mydashboard",
                "Version number",
                "GET /",
                "GET /customers/{id:int}",
                "POST A",
                "POST B",
            ]
        );

        let found = table.dispatch(&Method::POST, "/A").unwrap();
        assert_eq!(found.route.name(), "POST A");
    }

    #[test]
    fn test_missing_content_provider() {
        let services = Services::default()
            .with_customers(FakeCustomerRepository)
            .with_version(PackageVersion);
        let err = build_routes(&AppConfig::default(), &services).unwrap_err();
        assert!(matches!(
            err,
            RouteError::Config(ConfigError::MissingService("content provider"))
        ));
    }
}
