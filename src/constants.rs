//! Central Configuration Constants
//!
//! Single source of truth for all detection defaults.
//! To change a threshold or window, only edit this file.

/// App name
pub const APP_NAME: &str = "AI Sentinel";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sliding window span for per-client request tracking (seconds)
pub const WINDOW_SECONDS: f64 = 60.0;

/// Requests per client per window before the rate rule fires
pub const MAX_REQUESTS_PER_CLIENT_PER_MINUTE: usize = 50;

/// Errors on a (client, endpoint) pair before the error-rate rule fires
pub const ERROR_COUNT_THRESHOLD: u64 = 10;

/// Minimum samples required to train any model
pub const MIN_TRAINING_SAMPLES: usize = 10;

/// Expected anomaly fraction for the infrastructure-metrics model
pub const METRICS_CONTAMINATION: f64 = 0.1;

/// Expected anomaly fraction for the security model
pub const SECURITY_CONTAMINATION: f64 = 0.05;

/// Risk score above which a request is a threat
pub const THREAT_THRESHOLD: f64 = 0.5;

/// Number of trees in an isolation forest
pub const FOREST_TREE_COUNT: usize = 100;

/// Subsample size per tree
pub const FOREST_SUBSAMPLE_SIZE: usize = 256;

/// Seed for training-time sampling, so retraining on the same batch is reproducible
pub const FOREST_SEED: u64 = 42;

/// Default bound on tracked clients before LRU eviction kicks in
pub const DEFAULT_MAX_TRACKED_CLIENTS: usize = 10_000;

/// Default Prometheus-compatible metrics source
pub const DEFAULT_METRICS_URL: &str = "http://localhost:9090";

/// Default metrics poll interval (seconds)
pub const DEFAULT_POLL_INTERVAL: u64 = 30;

/// Samples collected before the poll loop trains its first model
pub const DEFAULT_BOOTSTRAP_SAMPLES: usize = 50;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the tracked-client capacity from environment or use default
pub fn get_max_tracked_clients() -> usize {
    std::env::var("SENTINEL_MAX_TRACKED_CLIENTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_TRACKED_CLIENTS)
}

/// Get the metrics source URL from environment or use default
pub fn get_metrics_url() -> String {
    std::env::var("SENTINEL_METRICS_URL")
        .unwrap_or_else(|_| DEFAULT_METRICS_URL.to_string())
}

/// Get the poll interval from environment or use default
pub fn get_poll_interval_secs() -> u64 {
    std::env::var("SENTINEL_POLL_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL)
}

/// Get the bootstrap batch size from environment or use default
pub fn get_bootstrap_samples() -> usize {
    std::env::var("SENTINEL_BOOTSTRAP_SAMPLES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_BOOTSTRAP_SAMPLES)
}
