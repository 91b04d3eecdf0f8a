//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → consumed once at Guard construction
//! ```
//!
//! # Design Decisions
//! - Config is static for the process lifetime; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClassifierConfig, CsrfConfig, EndpointClassConfig, EscalationConfig, GuardConfig,
    HeaderConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
};
