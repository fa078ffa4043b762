//! Configuration validation.
//!
//! Semantic checks on top of what Serde already enforces syntactically.
//! Validation is a pure function over the config and returns all errors,
//! not just the first.

use std::net::SocketAddr;

use crate::config::schema::GatekeeperConfig;

/// A single validation failure, pointing at the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatekeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(err("listener.bind_address", "not a valid socket address"));
    }

    if config.store.database_url.is_empty() {
        errors.push(err("store.database_url", "must not be empty"));
    }

    if config.cache.refresh_interval_secs == 0 {
        errors.push(err("cache.refresh_interval_secs", "must be greater than zero"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(err("timeouts.request_secs", "must be greater than zero"));
    }

    if config.security.ip_guard.enabled {
        if config.security.ip_guard.window_ms == 0 {
            errors.push(err("security.ip_guard.window_ms", "must be greater than zero"));
        }
        if config.security.ip_guard.max_requests == 0 {
            errors.push(err("security.ip_guard.max_requests", "must be greater than zero"));
        }
    }

    if config.security.rate_limit.enabled {
        if config.security.rate_limit.window_ms == 0 {
            errors.push(err("security.rate_limit.window_ms", "must be greater than zero"));
        }
        if config.security.rate_limit.max_requests == 0 {
            errors.push(err("security.rate_limit.max_requests", "must be greater than zero"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(err("observability.metrics_address", "not a valid socket address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
