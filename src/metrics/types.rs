//! Metrics Types
//!
//! Data structures for the infrastructure-metrics path.

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// One infrastructure metric observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricSample {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub response_time: f64,
    pub request_count: f64,
    pub error_rate: f64,
}

impl MetricSample {
    /// Feature order is fixed; training and scoring must agree on it
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector::new([
            self.cpu_usage,
            self.memory_usage,
            self.response_time,
            self.request_count,
            self.error_rate,
        ])
    }
}

/// Result of scoring one metric sample. Pure value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub is_anomaly: bool,
    /// Continuous decision value; more negative = more anomalous
    pub anomaly_score: f64,
    pub feature_values: MetricSample,
    pub timestamp: f64,
}
