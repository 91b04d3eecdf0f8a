//! Security response header composition.
//!
//! # Responsibilities
//! - Serialize the fixed security header set (CSP, HSTS, frame options,
//!   sniffing, referrer, permissions)
//! - Attach the current rate-limit quota and remaining count
//! - Attach the freshly issued CSRF token as header and cookie
//!
//! # Design Decisions
//! - No decision-making here; this only serializes already-computed state
//! - The CSP value is joined once at construction from the configured
//!   directive list

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY, SET_COOKIE,
    STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};

use crate::config::HeaderConfig;
use crate::guard::csrf::{CsrfTokenPair, CSRF_COOKIE};
use crate::guard::rate_limit::RateOutcome;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");
const X_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");
const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

pub struct HeaderComposer {
    csp: HeaderValue,
}

impl HeaderComposer {
    pub fn new(config: &HeaderConfig) -> Self {
        let mut directives = config.csp_directives.clone();
        directives.push("upgrade-insecure-requests".to_string());
        let joined = directives.join("; ");
        let csp = HeaderValue::from_str(&joined)
            .unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'"));
        Self { csp }
    }

    /// Serialize the full response header set for an allowed request.
    pub fn compose(&self, rate: &RateOutcome, csrf: &CsrfTokenPair) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_SECURITY_POLICY, self.csp.clone());
        headers.insert(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        headers.insert(
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        );
        headers.insert(
            PERMISSIONS_POLICY,
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        );
        headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));

        if let Ok(v) = HeaderValue::from_str(&rate.limit.to_string()) {
            headers.insert(X_RATELIMIT_LIMIT, v);
        }
        if let Ok(v) = HeaderValue::from_str(&rate.remaining.to_string()) {
            headers.insert(X_RATELIMIT_REMAINING, v);
        }

        if let Ok(v) = HeaderValue::from_str(&csrf.token) {
            headers.insert(X_CSRF_TOKEN, v);
        }
        let cookie = format!(
            "{CSRF_COOKIE}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
            csrf.token,
            csrf.max_age.as_secs()
        );
        if let Ok(v) = HeaderValue::from_str(&cookie) {
            headers.insert(SET_COOKIE, v);
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderConfig;
    use std::time::{Duration, Instant};

    fn outcome() -> RateOutcome {
        RateOutcome {
            allowed: true,
            limit: 100,
            remaining: 42,
            reset_at: Instant::now() + Duration::from_secs(900),
        }
    }

    #[test]
    fn compose_is_deterministic_for_identical_inputs() {
        let composer = HeaderComposer::new(&HeaderConfig::default());
        let token = CsrfTokenPair {
            token: "fixedtoken".to_string(),
            max_age: Duration::from_secs(3600),
        };
        let a = composer.compose(&outcome(), &token);
        let b = composer.compose(&outcome(), &token);
        assert_eq!(a, b);
    }

    #[test]
    fn compose_emits_the_full_header_set() {
        let composer = HeaderComposer::new(&HeaderConfig::default());
        let token = CsrfTokenPair {
            token: "tok".to_string(),
            max_age: Duration::from_secs(3600),
        };
        let headers = composer.compose(&outcome(), &token);

        for name in [
            "content-security-policy",
            "strict-transport-security",
            "x-frame-options",
            "x-content-type-options",
            "referrer-policy",
            "permissions-policy",
            "x-xss-protection",
            "x-ratelimit-limit",
            "x-ratelimit-remaining",
            "x-csrf-token",
            "set-cookie",
        ] {
            assert!(headers.contains_key(name), "missing header {name}");
        }

        let csp = headers["content-security-policy"].to_str().unwrap();
        assert!(csp.starts_with("default-src 'self'"));
        assert!(csp.ends_with("upgrade-insecure-requests"));

        let cookie = headers["set-cookie"].to_str().unwrap();
        assert!(cookie.starts_with("csrf-token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));

        assert_eq!(headers["x-ratelimit-remaining"], "42");
    }
}
