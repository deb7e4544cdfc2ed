//! Application collaborators.
//!
//! # Responsibilities
//! - Define the traits handlers depend on (customers, content, version)
//! - Hold the chosen implementations in one explicitly passed `Services` value
//!
//! # Design Decisions
//! - No container lookup: a route that needs a missing collaborator fails
//!   the build with `ConfigError::MissingService`
//! - Collaborators are `Arc<dyn Trait>`, shared read-only across requests

pub mod content;
pub mod customers;
pub mod version;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::routing::ConfigError;

pub use content::{ContentProvider, StaticContent};
pub use customers::{Customer, CustomerRepository, FakeCustomerRepository};
pub use version::{FixedVersion, PackageVersion, VersionSource};

/// Collaborators available to route registration.
#[derive(Clone, Default)]
pub struct Services {
    customers: Option<Arc<dyn CustomerRepository>>,
    content: Option<Arc<dyn ContentProvider>>,
    version: Option<Arc<dyn VersionSource>>,
}

impl Services {
    /// Fake implementations, with the version taken from config if set.
    pub fn standard(config: &AppConfig) -> Self {
        let services = Self::default()
            .with_customers(FakeCustomerRepository)
            .with_content(StaticContent::default());

        match &config.version.version {
            Some(fixed) => services.with_version(FixedVersion::new(fixed.clone())),
            None => services.with_version(PackageVersion),
        }
    }

    pub fn with_customers(mut self, repository: impl CustomerRepository) -> Self {
        self.customers = Some(Arc::new(repository));
        self
    }

    pub fn with_content(mut self, provider: impl ContentProvider) -> Self {
        self.content = Some(Arc::new(provider));
        self
    }

    pub fn with_version(mut self, source: impl VersionSource) -> Self {
        self.version = Some(Arc::new(source));
        self
    }

    pub fn customers(&self) -> Result<Arc<dyn CustomerRepository>, ConfigError> {
        self.customers
            .clone()
            .ok_or(ConfigError::MissingService("customer repository"))
    }

    pub fn content(&self) -> Result<Arc<dyn ContentProvider>, ConfigError> {
        self.content
            .clone()
            .ok_or(ConfigError::MissingService("content provider"))
    }

    pub fn version(&self) -> Result<Arc<dyn VersionSource>, ConfigError> {
        self.version
            .clone()
            .ok_or(ConfigError::MissingService("version source"))
    }
}
