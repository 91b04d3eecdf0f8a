//! Request admission subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → orchestrator.rs (block-set lookup, short-circuit known offenders)
//!     → classifier.rs (signature match on URL / User-Agent / Referer)
//!     → rate_limit.rs (fixed-window counter per client key)
//!     → csrf.rs (double-submit token check, unsafe methods only)
//!     → headers.rs (serialize security + rate + CSRF response headers)
//!     → Decision handed to the application layer
//! ```
//!
//! # Design Decisions
//! - Fail closed: block-set and CSRF checks deny when they cannot verify
//! - All mutable stores are private to their component; mutation happens
//!   only through atomic per-key operations
//! - Detection rules are a data-driven signature list, not hard-coded
//!   branches

pub mod classifier;
pub mod csrf;
pub mod headers;
pub mod ledger;
pub mod orchestrator;
pub mod rate_limit;

pub use classifier::{PatternClassifier, Severity, ThreatCategory, ThreatVerdict};
pub use csrf::{CsrfGuard, CsrfTokenPair};
pub use headers::HeaderComposer;
pub use ledger::ViolationLedger;
pub use orchestrator::{Decision, DenyReason, Guard, GuardRequest};
pub use rate_limit::{RateLimiter, RateOutcome};

use std::fmt;

/// Identity under which rate limits and violations are tracked.
///
/// Derived from the client network address. Not guaranteed unique across
/// NAT; treated as best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(ip: impl Into<String>) -> Self {
        Self(ip.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
