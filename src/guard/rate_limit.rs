//! Fixed-window rate limiting keyed by client, optionally scoped per
//! endpoint class.
//!
//! The counter and its window boundary are updated under the map's per-key
//! entry guard, so the window reset and the increment are one atomic unit:
//! two concurrent requests cannot both observe an expired window and both
//! reset the counter.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::guard::ClientKey;

/// Quota for one endpoint class. A negative limit means unlimited
/// (reserved; no shipped policy uses it).
#[derive(Debug, Clone, Copy)]
pub struct RatePolicy {
    pub limit: i64,
    pub window: Duration,
}

/// Outcome of a single rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateOutcome {
    pub allowed: bool,
    pub limit: i64,
    pub remaining: i64,
    pub reset_at: Instant,
}

impl RateOutcome {
    /// Whole seconds until the current window resets, at least 1.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_at
            .saturating_duration_since(Instant::now())
            .as_secs()
            .max(1)
    }
}

struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

struct ClassPolicy {
    path_prefix: String,
    policy: RatePolicy,
}

pub struct RateLimiter {
    windows: DashMap<String, WindowEntry>,
    /// Endpoint class name → quota. Unmatched classes use the default.
    policies: HashMap<String, ClassPolicy>,
    default_policy: RatePolicy,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let policies = config
            .endpoint_classes
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    ClassPolicy {
                        path_prefix: c.path_prefix.clone(),
                        policy: RatePolicy {
                            limit: c.limit,
                            window: Duration::from_secs(c.window_secs),
                        },
                    },
                )
            })
            .collect();

        Self {
            windows: DashMap::new(),
            policies,
            default_policy: RatePolicy {
                limit: config.default_limit,
                window: Duration::from_secs(config.default_window_secs),
            },
        }
    }

    /// Resolve the endpoint class for a request path, longest prefix wins.
    pub fn endpoint_class_for(&self, path: &str) -> Option<&str> {
        self.policies
            .iter()
            .filter(|(_, c)| path.starts_with(c.path_prefix.as_str()))
            .max_by_key(|(_, c)| c.path_prefix.len())
            .map(|(name, _)| name.as_str())
    }

    fn policy_for(&self, endpoint_class: Option<&str>) -> RatePolicy {
        endpoint_class
            .and_then(|name| self.policies.get(name))
            .map(|c| c.policy)
            .unwrap_or(self.default_policy)
    }

    /// Count one request against the key's current window.
    pub fn check(&self, key: &ClientKey, endpoint_class: Option<&str>) -> RateOutcome {
        let policy = self.policy_for(endpoint_class);
        let now = Instant::now();

        if policy.limit < 0 {
            return RateOutcome {
                allowed: true,
                limit: policy.limit,
                remaining: i64::MAX,
                reset_at: now + policy.window,
            };
        }

        let map_key = match endpoint_class {
            Some(class) => format!("{}:{class}", key.as_str()),
            None => key.as_str().to_string(),
        };

        let mut entry = self.windows.entry(map_key).or_insert_with(|| WindowEntry {
            count: 0,
            reset_at: now + policy.window,
        });

        if now > entry.reset_at {
            // Window expired: reset and count this request as the first.
            entry.count = 1;
            entry.reset_at = now + policy.window;
            return RateOutcome {
                allowed: true,
                limit: policy.limit,
                remaining: policy.limit - 1,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        if i64::from(entry.count) > policy.limit {
            RateOutcome {
                allowed: false,
                limit: policy.limit,
                remaining: 0,
                reset_at: entry.reset_at,
            }
        } else {
            RateOutcome {
                allowed: true,
                limit: policy.limit,
                remaining: policy.limit - i64::from(entry.count),
                reset_at: entry.reset_at,
            }
        }
    }

    /// Drop entries whose window has expired (background sweep). Takes the
    /// same per-key guards as the request path.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, entry| now <= entry.reset_at);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
