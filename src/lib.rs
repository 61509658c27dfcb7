//! AI Sentinel Core - Real-time anomaly and threat detection
//!
//! Ingests request and metric observations and produces risk assessments:
//! "this infrastructure sample is anomalous" or "this request looks like an
//! attack". Both paths share one scoring primitive - a trainable isolation
//! forest behind a train/score contract - composed differently:
//!
//! - the metrics path normalizes a 5-dimensional infrastructure vector and
//!   scores it;
//! - the security path fuses deterministic rules over tracked client
//!   activity with an optional model signal.
//!
//! ## Structure
//! - `features` - fixed-width feature vectors
//! - `model` - normalizer + isolation forest
//! - `tracker` - per-client sliding windows and error counters
//! - `security` - rule engine + fusion
//! - `metrics` - metrics anomaly detection
//! - `telemetry` - gauges/counters for an external exporter
//! - `collector` - async client for a Prometheus-compatible source
//! - `service` - transport-agnostic operation facade
//!
//! ## Usage
//! ```
//! use ai_sentinel_core::{DetectionService, RequestObservation};
//!
//! let service = DetectionService::new();
//! let assessment = service.analyze_request(&RequestObservation {
//!     client_id: "1.2.3.4".to_string(),
//!     user_agent: "sqlmap/1.0".to_string(),
//!     endpoint: "/login".to_string(),
//!     method: "GET".to_string(),
//!     status_code: 200,
//!     timestamp: 1_690_000_000.0,
//! });
//! assert!(!assessment.is_threat);
//! ```

pub mod collector;
pub mod constants;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod security;
pub mod service;
pub mod telemetry;
pub mod tracker;

pub use collector::MetricsCollector;
pub use error::{DetectorError, DetectorResult};
pub use features::{FeatureVector, FEATURE_COUNT};
pub use metrics::{AnomalyResult, MetricSample, MetricsAnomalyDetector};
pub use model::{IsolationForest, Normalizer};
pub use security::{
    RequestObservation, RuleThresholds, SecuritySummary, SecurityThreatDetector,
    SecurityTrainingSample, ThreatAssessment,
};
pub use service::DetectionService;
pub use telemetry::TelemetrySnapshot;
pub use tracker::ClientActivityTracker;
