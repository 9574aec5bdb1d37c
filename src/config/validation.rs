//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, threshold >= 1)
//! - Validate the base URL is an absolute http(s) address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before a client is constructed; invalid configs never reach the breaker

use std::fmt;

use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "base_url",
            format!("invalid URL '{}': {}", config.base_url, e),
        )),
    }

    if config.service_name.trim().is_empty() {
        errors.push(ValidationError::new("service_name", "must not be empty"));
    }

    if config.timeout_ms == 0 {
        errors.push(ValidationError::new("timeout_ms", "must be greater than 0"));
    }

    if config.max_retries > 0 && config.retry_delay_ms == 0 {
        errors.push(ValidationError::new(
            "retry_delay_ms",
            "must be greater than 0 when retries are enabled",
        ));
    }

    if config.health_timeout_ms == 0 {
        errors.push(ValidationError::new("health_timeout_ms", "must be greater than 0"));
    }

    if !config.health_path.starts_with('/') {
        errors.push(ValidationError::new("health_path", "must start with '/'"));
    }

    if let Some(header) = &config.correlation_header {
        if reqwest::header::HeaderName::from_bytes(header.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "correlation_header",
                format!("'{}' is not a valid header name", header),
            ));
        }
    }

    let breaker = &config.circuit_breaker;
    if breaker.enabled {
        if breaker.failure_threshold == 0 {
            errors.push(ValidationError::new(
                "circuit_breaker.failure_threshold",
                "must be at least 1",
            ));
        }
        if breaker.reset_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "circuit_breaker.reset_timeout_ms",
                "must be greater than 0",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
