//! Per-client violation tracking and offender escalation.
//!
//! Every detected threat and every rate-limit breach counts as one offense.
//! A client whose offense count reaches the escalation threshold is moved
//! into the block set and stays there for the process lifetime; the block
//! set is checked before any other policy runs.

use dashmap::{DashMap, DashSet};

use crate::guard::ClientKey;
use crate::observability::metrics;

pub struct ViolationLedger {
    offenses: DashMap<ClientKey, u32>,
    blocked: DashSet<ClientKey>,
    threshold: u32,
}

impl ViolationLedger {
    pub fn new(threshold: u32) -> Self {
        Self {
            offenses: DashMap::new(),
            blocked: DashSet::new(),
            threshold,
        }
    }

    /// Record one offense and return the post-increment count.
    ///
    /// Escalation into the block set happens here, under the same per-key
    /// entry guard as the increment; this is the only path into the set.
    pub fn record_offense(&self, key: &ClientKey) -> u32 {
        let mut entry = self.offenses.entry(key.clone()).or_insert(0);
        *entry += 1;
        let count = *entry;
        drop(entry);

        if count >= self.threshold && self.blocked.insert(key.clone()) {
            tracing::warn!(
                target: "audit",
                client = %key,
                offenses = count,
                action = "escalate",
                "client escalated to block set"
            );
            metrics::record_escalation();
        }
        count
    }

    /// Pure lookup against the block set.
    pub fn is_blocked(&self, key: &ClientKey) -> bool {
        self.blocked.contains(key)
    }

    pub fn offense_count(&self, key: &ClientKey) -> u32 {
        self.offenses.get(key).map(|e| *e).unwrap_or(0)
    }

    /// Administrative reset: remove a key from the block set and clear its
    /// offense count.
    pub fn reset(&self, key: &ClientKey) {
        self.blocked.remove(key);
        self.offenses.remove(key);
    }
}
