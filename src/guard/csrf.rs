//! Double-submit CSRF protection.
//!
//! A fresh opaque token is issued with every response, set both as a
//! response header and as an HttpOnly SameSite=Strict cookie. State-mutating
//! requests must echo the cookie value back in the `X-CSRF-Token` header;
//! validity is plain byte equality, expiry rides on the cookie TTL.

use std::time::Duration;

use axum::http::Method;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::CsrfConfig;

/// Header carrying the echoed token on state-changing requests.
pub const CSRF_HEADER: &str = "x-csrf-token";
/// Cookie delivering the token to the client.
pub const CSRF_COOKIE: &str = "csrf-token";

/// A freshly issued token and the lifetime of its delivery cookie.
#[derive(Debug, Clone)]
pub struct CsrfTokenPair {
    pub token: String,
    pub max_age: Duration,
}

pub struct CsrfGuard {
    token_length: usize,
    cookie_max_age: Duration,
}

impl CsrfGuard {
    pub fn new(config: &CsrfConfig) -> Self {
        Self {
            token_length: config.token_length,
            cookie_max_age: Duration::from_secs(config.cookie_max_age_secs),
        }
    }

    /// Generate a fresh random token, overwriting whatever the client held.
    pub fn issue_token(&self) -> CsrfTokenPair {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.token_length)
            .map(char::from)
            .collect();
        CsrfTokenPair {
            token,
            max_age: self.cookie_max_age,
        }
    }

    /// Validate the double-submit pair for a request.
    ///
    /// Safe methods never carry state changes and always pass. Everything
    /// else requires both tokens present, non-empty, and byte-equal.
    pub fn validate(
        &self,
        method: &Method,
        header_token: Option<&str>,
        cookie_token: Option<&str>,
    ) -> bool {
        if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
            return true;
        }
        match (header_token, cookie_token) {
            (Some(header), Some(cookie)) => !header.is_empty() && header == cookie,
            _ => false,
        }
    }
}
