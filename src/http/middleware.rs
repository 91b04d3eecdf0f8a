//! Guard middleware for axum.
//!
//! Extracts the request facts the guard needs, asks it for a decision, and
//! either short-circuits with the denial response or forwards the request
//! and merges the composed headers into the application's response.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::header::{HeaderMap, COOKIE, REFERER, USER_AGENT},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::guard::csrf::{CSRF_COOKIE, CSRF_HEADER};
use crate::guard::{Guard, GuardRequest};

pub async fn guard_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(guard): State<Arc<Guard>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4();
    let facts = extract_facts(&request, addr);

    tracing::debug!(
        request_id = %request_id,
        client = %facts.client_ip,
        method = %facts.method,
        path = %facts.target,
        "adjudicating request"
    );

    let decision = guard.decide(&facts);

    if !decision.allowed {
        let mut response = (decision.status, decision.body()).into_response();
        response.headers_mut().extend(decision.headers);
        return response;
    }

    let mut response = next.run(request).await;
    response.headers_mut().extend(decision.headers);
    response
}

fn extract_facts(request: &Request<Body>, peer: SocketAddr) -> GuardRequest {
    let headers = request.headers();

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    GuardRequest {
        method: request.method().clone(),
        target,
        client_ip: client_ip(headers, peer),
        user_agent: header_str(headers, USER_AGENT.as_str()).unwrap_or_default(),
        referer: header_str(headers, REFERER.as_str()).filter(|r| !r.is_empty()),
        csrf_header: header_str(headers, CSRF_HEADER),
        csrf_cookie: cookie_value(headers, CSRF_COOKIE),
    }
}

/// Best-effort client address: first hop of X-Forwarded-For, then
/// X-Real-IP, then the socket peer. Forwarded headers are spoofable;
/// the key is advisory identity, not authentication.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    peer.ip().to_string()
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Find a cookie value across all Cookie headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((k, v)) = pair.trim().split_once('=') {
                if k == name {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}
