//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, LoadError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(LoadError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.dashboard.title, "My dashboard");
        assert_eq!(config.version.version, None);
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [dashboard]
            title = "Ops"

            [version]
            version = "9.9.9"
            "#,
        )
        .unwrap();
        assert_eq!(config.dashboard.title, "Ops");
        assert_eq!(config.dashboard.prefix, "/mydashboard");
        assert_eq!(config.version.version.as_deref(), Some("9.9.9"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_config("[listener\nbind_address = 1"),
            Err(LoadError::Parse(_))
        ));

        let err = parse_config("[timeouts]\nrequest_secs = 0\n[limits]\nmax_body_size = 0").unwrap_err();
        assert!(matches!(err, LoadError::Validation(ref errors) if errors.len() == 2));
        assert_eq!(
            err.to_string(),
            "validation failed: timeouts.request_secs must be greater than zero, \
             limits.max_body_size must be greater than zero"
        );

        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
