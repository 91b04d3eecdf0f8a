//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so a minimal config is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge guard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Rate limiting quotas and windows.
    pub rate_limit: RateLimitConfig,

    /// Offender escalation settings.
    pub escalation: EscalationConfig,

    /// CSRF token settings.
    pub csrf: CsrfConfig,

    /// Response security headers.
    pub headers: HeaderConfig,

    /// Threat classification settings.
    pub classifier: ClassifierConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Default quota for endpoints without a class override.
    /// `-1` is reserved to mean unlimited.
    pub default_limit: i64,

    /// Default window length in seconds.
    pub default_window_secs: u64,

    /// Interval between background sweeps of expired windows, in seconds.
    pub sweep_interval_secs: u64,

    /// Per-endpoint-class quota overrides.
    pub endpoint_classes: Vec<EndpointClassConfig>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            default_window_secs: 900,
            sweep_interval_secs: 60,
            endpoint_classes: Vec::new(),
        }
    }
}

/// A named endpoint class with its own quota and window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointClassConfig {
    /// Class identifier used in logs and rate keys.
    pub name: String,

    /// Requests whose path starts with this prefix belong to the class.
    pub path_prefix: String,

    /// Quota for the class. `-1` is reserved to mean unlimited.
    pub limit: i64,

    /// Window length in seconds.
    pub window_secs: u64,
}

/// Offender escalation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Offense count at which a client enters the block set.
    pub threshold: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self { threshold: 10 }
    }
}

/// CSRF token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Length of issued tokens in characters.
    pub token_length: usize,

    /// Lifetime of the delivery cookie in seconds.
    pub cookie_max_age_secs: u64,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            token_length: 32,
            cookie_max_age_secs: 3600,
        }
    }
}

/// Response header configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Ordered Content-Security-Policy directives.
    /// `upgrade-insecure-requests` is always appended.
    pub csp_directives: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            csp_directives: vec![
                "default-src 'self'".to_string(),
                "script-src 'self'".to_string(),
                "style-src 'self' 'unsafe-inline'".to_string(),
                "font-src 'self'".to_string(),
                "img-src 'self' data:".to_string(),
                "connect-src 'self'".to_string(),
                "frame-src 'none'".to_string(),
                "object-src 'none'".to_string(),
                "base-uri 'self'".to_string(),
                "form-action 'self'".to_string(),
            ],
        }
    }
}

/// Threat classification configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Origins whose referrers are never treated as suspicious.
    pub trusted_origins: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
