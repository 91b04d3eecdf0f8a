//! Edge request guard: per-request admission control for HTTP services.
//!
//! Classifies inbound requests against attack signatures, enforces
//! fixed-window rate limits, validates double-submit CSRF tokens, and
//! escalates repeat offenders into a process-lifetime block set, before the
//! request reaches application logic. The application layer receives a
//! single [`Decision`](guard::Decision) per request.

pub mod config;
pub mod guard;
pub mod http;
pub mod observability;

pub use config::GuardConfig;
pub use guard::{Decision, DenyReason, Guard, GuardRequest};
pub use http::GuardServer;
