//! Per-request adjudication.
//!
//! Sequences the admission checks for each inbound request and produces a
//! single [`Decision`]. Order is fixed: block-set lookup, threat
//! classification, rate limiting, CSRF validation. Each check can terminate
//! the request with a denial; there are no retries, every request is
//! adjudicated exactly once.

use axum::http::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use axum::http::{Method, StatusCode};

use crate::config::GuardConfig;
use crate::guard::classifier::{PatternClassifier, ThreatCategory};
use crate::guard::csrf::CsrfGuard;
use crate::guard::headers::HeaderComposer;
use crate::guard::ledger::ViolationLedger;
use crate::guard::rate_limit::{RateLimiter, RateOutcome};
use crate::guard::ClientKey;
use crate::observability::metrics;

/// Everything the guard reads from an inbound request.
#[derive(Debug, Clone)]
pub struct GuardRequest {
    pub method: Method,
    /// Path and query of the request URI.
    pub target: String,
    /// Best-effort client address (forwarded header or socket peer).
    pub client_ip: String,
    pub user_agent: String,
    pub referer: Option<String>,
    /// Value of the `X-CSRF-Token` header, if present.
    pub csrf_header: Option<String>,
    /// Value of the `csrf-token` cookie, if present.
    pub csrf_cookie: Option<String>,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    ClientBlocked,
    ThreatDetected(ThreatCategory),
    RateLimitExceeded,
    CsrfInvalid,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::ClientBlocked => "client_blocked",
            DenyReason::ThreatDetected(_) => "threat_detected",
            DenyReason::RateLimitExceeded => "rate_limit_exceeded",
            DenyReason::CsrfInvalid => "csrf_invalid",
        }
    }
}

/// Verdict handed to the application layer. On deny the caller must
/// short-circuit with `status`; on allow it must merge `headers` into its
/// eventual response.
#[derive(Debug)]
pub struct Decision {
    pub allowed: bool,
    pub status: StatusCode,
    pub reason: Option<DenyReason>,
    pub headers: HeaderMap,
}

impl Decision {
    fn allow(headers: HeaderMap) -> Self {
        Self {
            allowed: true,
            status: StatusCode::OK,
            reason: None,
            headers,
        }
    }

    fn deny(status: StatusCode, reason: DenyReason) -> Self {
        Self {
            allowed: false,
            status,
            reason: Some(reason),
            headers: HeaderMap::new(),
        }
    }

    /// Body text for a denial response.
    pub fn body(&self) -> &'static str {
        if self.status == StatusCode::TOO_MANY_REQUESTS {
            "Too Many Requests"
        } else {
            "Forbidden"
        }
    }
}

/// The admission-control runtime. Owns all mutable per-process stores;
/// nothing outside this object mutates them.
pub struct Guard {
    classifier: PatternClassifier,
    ledger: ViolationLedger,
    limiter: RateLimiter,
    csrf: CsrfGuard,
    composer: HeaderComposer,
}

impl Guard {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            classifier: PatternClassifier::new(config.classifier.trusted_origins.clone()),
            ledger: ViolationLedger::new(config.escalation.threshold),
            limiter: RateLimiter::new(&config.rate_limit),
            csrf: CsrfGuard::new(&config.csrf),
            composer: HeaderComposer::new(&config.headers),
        }
    }

    /// Adjudicate one request.
    pub fn decide(&self, req: &GuardRequest) -> Decision {
        let key = ClientKey::new(req.client_ip.clone());

        // Previously escalated clients are rejected before anything else.
        if self.ledger.is_blocked(&key) {
            return self.deny(&key, StatusCode::FORBIDDEN, DenyReason::ClientBlocked);
        }

        if let Some(verdict) =
            self.classifier
                .classify(&req.target, &req.user_agent, req.referer.as_deref())
        {
            self.ledger.record_offense(&key);
            return self.deny(
                &key,
                StatusCode::FORBIDDEN,
                DenyReason::ThreatDetected(verdict.category),
            );
        }

        let endpoint_class = self.limiter.endpoint_class_for(path_of(&req.target));
        let rate = self.limiter.check(&key, endpoint_class);
        if !rate.allowed {
            self.ledger.record_offense(&key);
            let mut decision =
                self.deny(&key, StatusCode::TOO_MANY_REQUESTS, DenyReason::RateLimitExceeded);
            attach_rate_headers(&mut decision.headers, &rate);
            return decision;
        }

        if !self
            .csrf
            .validate(&req.method, req.csrf_header.as_deref(), req.csrf_cookie.as_deref())
        {
            return self.deny(&key, StatusCode::FORBIDDEN, DenyReason::CsrfInvalid);
        }

        let token = self.csrf.issue_token();
        metrics::record_decision("allow", "none");
        Decision::allow(self.composer.compose(&rate, &token))
    }

    fn deny(&self, key: &ClientKey, status: StatusCode, reason: DenyReason) -> Decision {
        match reason {
            DenyReason::ThreatDetected(category) => tracing::warn!(
                target: "audit",
                client = %key,
                reason = reason.as_str(),
                category = category.as_str(),
                status = status.as_u16(),
                action = "deny",
                "request denied"
            ),
            _ => tracing::warn!(
                target: "audit",
                client = %key,
                reason = reason.as_str(),
                status = status.as_u16(),
                action = "deny",
                "request denied"
            ),
        }
        metrics::record_decision("deny", reason.as_str());
        Decision::deny(status, reason)
    }

    /// Remove expired rate-limit windows. Called by the background sweep.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.limiter.sweep();
        if removed > 0 {
            tracing::debug!(removed, "swept expired rate-limit entries");
        }
        metrics::record_sweep(removed);
        removed
    }

    pub fn ledger(&self) -> &ViolationLedger {
        &self.ledger
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

fn attach_rate_headers(headers: &mut HeaderMap, rate: &RateOutcome) {
    if let Ok(v) = HeaderValue::from_str(&rate.retry_after_secs().to_string()) {
        headers.insert(RETRY_AFTER, v);
    }
    if let Ok(v) = HeaderValue::from_str(&rate.limit.to_string()) {
        headers.insert("x-ratelimit-limit", v);
    }
    headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
}

/// Strip the query string for endpoint-class matching.
fn path_of(target: &str) -> &str {
    target.split('?').next().unwrap_or(target)
}
