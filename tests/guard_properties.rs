//! Behavioral properties of the guard, exercised through its public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use edge_guard::config::{EndpointClassConfig, GuardConfig};
use edge_guard::guard::ClientKey;
use edge_guard::{DenyReason, Guard, GuardRequest};

const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/126.0";

fn config_with_limit(limit: i64, window_secs: u64) -> GuardConfig {
    let mut config = GuardConfig::default();
    config.rate_limit.default_limit = limit;
    config.rate_limit.default_window_secs = window_secs;
    config
}

fn get(target: &str, ip: &str) -> GuardRequest {
    GuardRequest {
        method: Method::GET,
        target: target.to_string(),
        client_ip: ip.to_string(),
        user_agent: BROWSER_UA.to_string(),
        referer: None,
        csrf_header: None,
        csrf_cookie: None,
    }
}

fn post(ip: &str, header: Option<&str>, cookie: Option<&str>) -> GuardRequest {
    GuardRequest {
        method: Method::POST,
        target: "/submit".to_string(),
        client_ip: ip.to_string(),
        user_agent: BROWSER_UA.to_string(),
        referer: None,
        csrf_header: header.map(str::to_string),
        csrf_cookie: cookie.map(str::to_string),
    }
}

#[test]
fn quota_arithmetic_within_a_window() {
    let quota = 5;
    let guard = Guard::new(&config_with_limit(quota, 900));

    for n in 1..=quota {
        let decision = guard.decide(&get("/", "192.0.2.1"));
        assert!(decision.allowed, "request {n} of {quota} should pass");
        let remaining: i64 = decision.headers["x-ratelimit-remaining"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(remaining, quota - n);
    }

    let decision = guard.decide(&get("/", "192.0.2.1"));
    assert!(!decision.allowed);
    assert_eq!(decision.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(decision.reason, Some(DenyReason::RateLimitExceeded));
    assert!(decision.headers.contains_key("retry-after"));
    assert_eq!(decision.headers["x-ratelimit-remaining"], "0");
}

#[test]
fn distinct_clients_do_not_share_windows() {
    let guard = Guard::new(&config_with_limit(1, 900));
    assert!(guard.decide(&get("/", "192.0.2.1")).allowed);
    assert!(!guard.decide(&get("/", "192.0.2.1")).allowed);
    assert!(guard.decide(&get("/", "192.0.2.2")).allowed);
}

#[test]
fn throttling_does_not_outlive_its_window() {
    let guard = Guard::new(&config_with_limit(2, 1));

    assert!(guard.decide(&get("/", "192.0.2.3")).allowed);
    assert!(guard.decide(&get("/", "192.0.2.3")).allowed);
    assert!(!guard.decide(&get("/", "192.0.2.3")).allowed);

    std::thread::sleep(Duration::from_millis(1100));

    let decision = guard.decide(&get("/", "192.0.2.3"));
    assert!(decision.allowed, "fresh window should admit the request");
    // Counter reset to 1: full quota minus this request remains.
    assert_eq!(decision.headers["x-ratelimit-remaining"], "1");
}

#[test]
fn endpoint_classes_get_their_own_quota() {
    let mut config = config_with_limit(100, 900);
    config.rate_limit.endpoint_classes.push(EndpointClassConfig {
        name: "auth".to_string(),
        path_prefix: "/auth".to_string(),
        limit: 2,
        window_secs: 900,
    });
    let guard = Guard::new(&config);

    assert!(guard.decide(&get("/auth/login", "192.0.2.4")).allowed);
    assert!(guard.decide(&get("/auth/login", "192.0.2.4")).allowed);
    assert!(!guard.decide(&get("/auth/login", "192.0.2.4")).allowed);
    // The default-class quota is untouched.
    assert!(guard.decide(&get("/profile", "192.0.2.4")).allowed);
}

#[test]
fn ten_offenses_escalate_permanently() {
    let guard = Guard::new(&GuardConfig::default());
    let attacker = "203.0.113.9";

    for _ in 0..10 {
        let decision = guard.decide(&get("/search?q=<script>alert(1)</script>", attacker));
        assert_eq!(decision.status, StatusCode::FORBIDDEN);
        assert!(matches!(
            decision.reason,
            Some(DenyReason::ThreatDetected(_))
        ));
    }

    assert!(guard.ledger().is_blocked(&ClientKey::new(attacker)));

    // A perfectly clean request is now rejected with zero further analysis.
    let decision = guard.decide(&get("/", attacker));
    assert!(!decision.allowed);
    assert_eq!(decision.status, StatusCode::FORBIDDEN);
    assert_eq!(decision.reason, Some(DenyReason::ClientBlocked));
}

#[test]
fn mixed_threats_and_breaches_accumulate_into_escalation() {
    let mut config = config_with_limit(2, 900);
    config.escalation.threshold = 10;
    let guard = Guard::new(&config);
    let attacker = "203.0.113.10";

    // 5 offenses from threats.
    for _ in 0..5 {
        guard.decide(&get("/x?q=1' OR '1'='1", attacker));
    }
    // 2 clean requests fill the quota, 5 breaches add 5 more offenses.
    for _ in 0..7 {
        guard.decide(&get("/", attacker));
    }

    assert_eq!(guard.ledger().offense_count(&ClientKey::new(attacker)), 10);
    let decision = guard.decide(&get("/", attacker));
    assert_eq!(decision.reason, Some(DenyReason::ClientBlocked));
}

#[test]
fn administrative_reset_unblocks_a_client() {
    let guard = Guard::new(&GuardConfig::default());
    let key = ClientKey::new("203.0.113.11");

    for _ in 0..10 {
        guard.ledger().record_offense(&key);
    }
    assert!(guard.ledger().is_blocked(&key));

    guard.ledger().reset(&key);
    assert!(!guard.ledger().is_blocked(&key));
    assert!(guard.decide(&get("/", "203.0.113.11")).allowed);
}

#[test]
fn csrf_matrix_for_unsafe_methods() {
    let guard = Guard::new(&GuardConfig::default());

    let allowed = guard.decide(&post("192.0.2.5", Some("tok"), Some("tok")));
    assert!(allowed.allowed);

    for (header, cookie) in [
        (Some("tok"), Some("other")),
        (None, Some("tok")),
        (Some("tok"), None),
        (None, None),
        (Some(""), Some("")),
    ] {
        let decision = guard.decide(&post("192.0.2.5", header, cookie));
        assert!(!decision.allowed, "pair {header:?}/{cookie:?} must fail");
        assert_eq!(decision.status, StatusCode::FORBIDDEN);
        assert_eq!(decision.reason, Some(DenyReason::CsrfInvalid));
    }

    // GET never inspects tokens.
    assert!(guard.decide(&get("/", "192.0.2.5")).allowed);
}

#[test]
fn allowed_responses_carry_the_security_header_set() {
    let guard = Guard::new(&GuardConfig::default());
    let decision = guard.decide(&get("/", "192.0.2.6"));
    assert!(decision.allowed);

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
        assert!(decision.headers.contains_key(name), "missing {name}");
    }

    // Tokens are fresh per response.
    let second = guard.decide(&get("/", "192.0.2.6"));
    assert_ne!(
        decision.headers["x-csrf-token"],
        second.headers["x-csrf-token"]
    );
}

#[test]
fn sweep_removes_only_expired_windows() {
    let mut config = config_with_limit(5, 1);
    config.rate_limit.endpoint_classes.push(EndpointClassConfig {
        name: "slow".to_string(),
        path_prefix: "/slow".to_string(),
        limit: 5,
        window_secs: 3600,
    });
    let guard = Guard::new(&config);

    guard.decide(&get("/", "192.0.2.7"));
    guard.decide(&get("/slow/op", "192.0.2.7"));
    assert_eq!(guard.limiter().tracked_keys(), 2);

    std::thread::sleep(Duration::from_millis(1100));
    let removed = guard.sweep_expired();
    assert_eq!(removed, 1);
    assert_eq!(guard.limiter().tracked_keys(), 1);
}

#[test]
fn concurrent_requests_never_exceed_quota() {
    let quota = 10;
    let guard = Arc::new(Guard::new(&config_with_limit(quota, 900)));
    let allowed = Arc::new(AtomicUsize::new(0));
    let denied = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for _ in 0..(2 * quota) {
            let guard = guard.clone();
            let allowed = allowed.clone();
            let denied = denied.clone();
            scope.spawn(move || {
                let decision = guard.decide(&get("/", "198.51.100.99"));
                if decision.allowed {
                    allowed.fetch_add(1, Ordering::SeqCst);
                } else {
                    denied.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(allowed.load(Ordering::SeqCst), quota as usize);
    assert_eq!(denied.load(Ordering::SeqCst), quota as usize);
}
