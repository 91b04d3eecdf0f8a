//! Signature-based threat classification.
//!
//! Pure function over the request URL, User-Agent, and Referer. Rules are
//! evaluated in a fixed order and the first match wins:
//! injection/XSS/traversal/command signatures, then bot heuristics (with a
//! crawler allow-list checked first), then suspicious referrers.

use regex::Regex;

/// Category assigned to a detected threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatCategory {
    Injection,
    Xss,
    PathTraversal,
    CommandInjection,
    MaliciousBot,
    SuspiciousReferrer,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Injection => "injection",
            ThreatCategory::Xss => "xss",
            ThreatCategory::PathTraversal => "path_traversal",
            ThreatCategory::CommandInjection => "command_injection",
            ThreatCategory::MaliciousBot => "malicious_bot",
            ThreatCategory::SuspiciousReferrer => "suspicious_referrer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Result of classifying a single request. `None` from [`PatternClassifier::classify`]
/// means the request looked clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatVerdict {
    pub category: ThreatCategory,
    pub severity: Severity,
}

/// One attack signature: a pattern plus the verdict it produces.
struct Signature {
    pattern: Regex,
    category: ThreatCategory,
    severity: Severity,
}

/// Maximum plausible User-Agent length; anything longer is treated as a bot.
const MAX_USER_AGENT_LEN: usize = 500;

/// Referrer substrings associated with spam/malware campaigns.
const SUSPICIOUS_REFERRER_TOKENS: &[&str] = &[
    "casino",
    "viagra",
    "pharma",
    "payday",
    "porn",
    "replica-watch",
    "seo-offer",
    "malware",
    "phishing",
];

pub struct PatternClassifier {
    signatures: Vec<Signature>,
    crawler_allow: Regex,
    scraper_deny: Regex,
    generic_bot: Regex,
    trusted_origins: Vec<String>,
}

impl PatternClassifier {
    pub fn new(trusted_origins: Vec<String>) -> Self {
        Self {
            signatures: build_signatures(),
            // Legitimate search-engine crawlers, exempt from bot detection.
            crawler_allow: compile(
                r"(?i)googlebot|bingbot|slurp|duckduckbot|baiduspider|yandex(bot)?|applebot",
            ),
            scraper_deny: compile(
                r"(?i)scrapy|httrack|harvest|nutch|nikto|sqlmap|masscan|zgrab|python-requests|go-http-client",
            ),
            generic_bot: compile(r"(?i)bot|crawler|spider"),
            trusted_origins,
        }
    }

    /// Classify a request. Returns `None` when no rule matches.
    pub fn classify(
        &self,
        url: &str,
        user_agent: &str,
        referer: Option<&str>,
    ) -> Option<ThreatVerdict> {
        // 1. Attack signatures against URL and User-Agent.
        for sig in &self.signatures {
            if sig.pattern.is_match(url) || sig.pattern.is_match(user_agent) {
                return Some(ThreatVerdict {
                    category: sig.category,
                    severity: sig.severity,
                });
            }
        }

        // 2. Bot heuristics. Known crawlers short-circuit to clean.
        if !self.crawler_allow.is_match(user_agent) {
            let bot = user_agent.is_empty()
                || user_agent.len() > MAX_USER_AGENT_LEN
                || self.scraper_deny.is_match(user_agent)
                || self.generic_bot.is_match(user_agent);
            if bot {
                return Some(ThreatVerdict {
                    category: ThreatCategory::MaliciousBot,
                    severity: Severity::High,
                });
            }
        }

        // 3. Suspicious referrer, unless it points at a trusted origin.
        if let Some(referer) = referer {
            if !referer.is_empty() && !self.is_trusted_origin(referer) {
                let lowered = referer.to_ascii_lowercase();
                if SUSPICIOUS_REFERRER_TOKENS.iter().any(|t| lowered.contains(t)) {
                    return Some(ThreatVerdict {
                        category: ThreatCategory::SuspiciousReferrer,
                        severity: Severity::Medium,
                    });
                }
            }
        }

        None
    }

    fn is_trusted_origin(&self, referer: &str) -> bool {
        self.trusted_origins.iter().any(|o| referer.starts_with(o.as_str()))
    }
}

fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants; a failure here is a programming
    // error caught by the tests below.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid builtin signature {pattern:?}: {e}"))
}

/// Ordered signature list. First match wins, so more specific patterns
/// come before broader ones.
fn build_signatures() -> Vec<Signature> {
    vec![
        Signature {
            pattern: compile(
                r"(?i)('|%27)\s*(or|and)\s*('|%27)|union\s+select|select\s+.+\s+from\s|insert\s+into|drop\s+table|\bor\b\s+\d+\s*=\s*\d+",
            ),
            category: ThreatCategory::Injection,
            severity: Severity::Critical,
        },
        Signature {
            pattern: compile(r"(?i)<script|javascript:|\bon(load|error|click|mouseover)\s*=|eval\s*\("),
            category: ThreatCategory::Xss,
            severity: Severity::Critical,
        },
        Signature {
            pattern: compile(r"(?i)\.\./|\.\.\\|%2e%2e%2f|/etc/(passwd|shadow)"),
            category: ThreatCategory::PathTraversal,
            severity: Severity::Critical,
        },
        Signature {
            pattern: compile(r"(?i)[;&|`]\s*(cat|ls|rm|wget|curl|nc|bash|sh|cmd|powershell)\b"),
            category: ThreatCategory::CommandInjection,
            severity: Severity::Critical,
        },
    ]
}
