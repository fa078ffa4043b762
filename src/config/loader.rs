//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatekeeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatekeeperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatekeeperConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("does-not-exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_minimal_config() {
        let dir = std::env::temp_dir().join("gatekeeper-loader-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("minimal.toml");
        std::fs::write(
            &path,
            r#"
            [listener]
            bind_address = "127.0.0.1:9999"

            [security.rate_limit]
            enabled = true
            window_ms = 1000
            max_requests = 3
            "#,
        )
        .unwrap();

        let config = load_config(&path).expect("minimal config should load");
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.security.rate_limit.max_requests, 3);
        // Untouched sections keep their defaults.
        assert!(config.security.auth.enabled);
        assert_eq!(config.cache.refresh_interval_secs, 60);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = std::env::temp_dir().join("gatekeeper-loader-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("invalid.toml");
        std::fs::write(
            &path,
            r#"
            [security.ip_guard]
            enabled = true
            window_ms = 0
            max_requests = 0
            "#,
        )
        .unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        std::fs::remove_file(&path).ok();
    }
}
