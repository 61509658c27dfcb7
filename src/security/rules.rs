//! Security Rules & Weights
//!
//! Denylists, rule weights, and configurable thresholds for the deterministic
//! stage of threat analysis. No analysis logic here.

use serde::{Deserialize, Serialize};

use crate::constants::{ERROR_COUNT_THRESHOLD, MAX_REQUESTS_PER_CLIENT_PER_MINUTE};

// ============================================================================
// RULE WEIGHTS (additive, capped once at the end)
// ============================================================================

/// Denylisted user agent
pub const SUSPICIOUS_AGENT_WEIGHT: f64 = 0.3;

/// Request rate over the per-minute threshold
pub const HIGH_RATE_WEIGHT: f64 = 0.4;

/// Sensitive endpoint fragment
pub const SENSITIVE_ENDPOINT_WEIGHT: f64 = 0.2;

/// HTTP method outside the allowed set
pub const UNUSUAL_METHOD_WEIGHT: f64 = 0.1;

/// Error counter over threshold
pub const ERROR_RATE_WEIGHT: f64 = 0.3;

/// Model flagged the request as an outlier
pub const MODEL_ANOMALY_WEIGHT: f64 = 0.5;

// ============================================================================
// DENYLISTS
// ============================================================================

/// User-agent fragments associated with scanning and exploitation tools
pub const SUSPICIOUS_USER_AGENTS: &[&str] = &[
    "sqlmap", "nmap", "nikto", "dirb", "gobuster", "wfuzz",
    "burp", "zap", "scanner", "bot", "crawler", "spider",
];

/// Path fragments that legitimate traffic rarely touches
pub const SENSITIVE_ENDPOINTS: &[&str] = &[
    "/admin", "/wp-admin", "/phpmyadmin", "/.env", "/config",
    "/api/v1/admin", "/internal", "/debug", "/test",
];

/// Methods considered ordinary
pub const ALLOWED_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];

// ============================================================================
// MATCHERS
// ============================================================================

/// First denylisted fragment contained in the user agent, case-insensitive
pub fn match_suspicious_agent(user_agent: &str) -> Option<&'static str> {
    let lowered = user_agent.to_lowercase();
    SUSPICIOUS_USER_AGENTS
        .iter()
        .find(|fragment| lowered.contains(*fragment))
        .copied()
}

/// First sensitive fragment contained in the endpoint, case-insensitive
pub fn match_sensitive_endpoint(endpoint: &str) -> Option<&'static str> {
    let lowered = endpoint.to_lowercase();
    SENSITIVE_ENDPOINTS
        .iter()
        .find(|fragment| lowered.contains(*fragment))
        .copied()
}

pub fn is_allowed_method(method: &str) -> bool {
    ALLOWED_METHODS.contains(&method)
}

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Rule thresholds (configurable at detector construction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Window size above which the rate rule fires
    pub max_requests_per_minute: usize,
    /// Error count above which the error-rate rule fires
    pub error_count_threshold: u64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            max_requests_per_minute: MAX_REQUESTS_PER_CLIENT_PER_MINUTE,
            error_count_threshold: ERROR_COUNT_THRESHOLD,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_match_is_case_insensitive_first_wins() {
        assert_eq!(match_suspicious_agent("SQLMap/1.7"), Some("sqlmap"));
        assert_eq!(match_suspicious_agent("Mozilla/5.0"), None);
        // contains both "bot" and "crawler"; list order decides
        assert_eq!(match_suspicious_agent("MegaBot crawler"), Some("bot"));
    }

    #[test]
    fn test_endpoint_match() {
        assert_eq!(match_sensitive_endpoint("/WP-Admin/setup"), Some("/wp-admin"));
        assert_eq!(match_sensitive_endpoint("/orders/42"), None);
        assert_eq!(match_sensitive_endpoint(""), None);
    }

    #[test]
    fn test_method_allowlist_is_exact() {
        assert!(is_allowed_method("GET"));
        assert!(is_allowed_method("PATCH"));
        assert!(!is_allowed_method("TRACE"));
        assert!(!is_allowed_method("get"));
        assert!(!is_allowed_method(""));
    }
}
