//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect conflicting mount prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    /// Prefix must start with `/` and contain no braces.
    #[error("{field} `{value}` is not a valid mount prefix")]
    MountPrefix { field: &'static str, value: String },

    #[error("dashboard and version are both mounted at `{0}`")]
    DuplicateMountPrefix(String),

    #[error("dashboard.title must not be empty")]
    EmptyDashboardTitle,

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let prefixes = [
        ("dashboard.prefix", &config.dashboard.prefix),
        ("version.prefix", &config.version.prefix),
    ];
    for (field, value) in prefixes {
        if !is_valid_prefix(value) {
            errors.push(ValidationError::MountPrefix {
                field,
                value: value.clone(),
            });
        }
    }

    if normalize_prefix(&config.dashboard.prefix) == normalize_prefix(&config.version.prefix) {
        errors.push(ValidationError::DuplicateMountPrefix(
            config.dashboard.prefix.clone(),
        ));
    }

    if config.dashboard.title.trim().is_empty() {
        errors.push(ValidationError::EmptyDashboardTitle);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    prefix.starts_with('/') && !prefix.contains(['{', '}'])
}

fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}
