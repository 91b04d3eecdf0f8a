//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Guard components produce:
//!     → logging.rs (structured log events; denials and escalations
//!       under the "audit" target for external consumers)
//!     → metrics.rs (decision/escalation/sweep counters)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
