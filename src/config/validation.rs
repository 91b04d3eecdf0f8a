//! Configuration validation.
//!
//! Serde handles syntactic checks; this pass does the semantic ones and
//! returns every violation it finds, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GuardConfig;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener bind_address '{0}' is not a valid socket address")]
    BadBindAddress(String),

    #[error("rate limit window for '{0}' must be nonzero")]
    ZeroWindow(String),

    #[error("rate limit for '{0}' must be nonzero (use -1 for unlimited)")]
    ZeroLimit(String),

    #[error("duplicate endpoint class '{0}'")]
    DuplicateClass(String),

    #[error("endpoint class '{0}' has an empty path_prefix")]
    EmptyPathPrefix(String),

    #[error("escalation threshold must be nonzero")]
    ZeroThreshold,

    #[error("csrf token_length must be at least 16")]
    ShortCsrfToken,

    #[error("csp directive must not be empty or contain ';'")]
    BadCspDirective,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.rate_limit.default_window_secs == 0 {
        errors.push(ValidationError::ZeroWindow("default".to_string()));
    }
    if config.rate_limit.default_limit == 0 {
        errors.push(ValidationError::ZeroLimit("default".to_string()));
    }

    let mut seen = HashSet::new();
    for class in &config.rate_limit.endpoint_classes {
        if !seen.insert(class.name.as_str()) {
            errors.push(ValidationError::DuplicateClass(class.name.clone()));
        }
        if class.window_secs == 0 {
            errors.push(ValidationError::ZeroWindow(class.name.clone()));
        }
        if class.limit == 0 {
            errors.push(ValidationError::ZeroLimit(class.name.clone()));
        }
        if class.path_prefix.is_empty() {
            errors.push(ValidationError::EmptyPathPrefix(class.name.clone()));
        }
    }

    if config.escalation.threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }

    if config.csrf.token_length < 16 {
        errors.push(ValidationError::ShortCsrfToken);
    }

    if config
        .headers
        .csp_directives
        .iter()
        .any(|d| d.trim().is_empty() || d.contains(';'))
    {
        errors.push(ValidationError::BadCspDirective);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
