//! Detection Service - Transport-agnostic operation facade
//!
//! One place that owns both detectors and exposes the operations a transport
//! layer marshals to. The detectors are independent and share no state; they
//! share only the scorer abstraction.

use crate::error::DetectorResult;
use crate::metrics::{AnomalyResult, MetricSample, MetricsAnomalyDetector};
use crate::security::{
    RequestObservation, SecuritySummary, SecurityThreatDetector, SecurityTrainingSample,
    ThreatAssessment,
};
use crate::telemetry::{self, TelemetrySnapshot};

/// Owns the two detection paths
pub struct DetectionService {
    metrics: MetricsAnomalyDetector,
    security: SecurityThreatDetector,
}

impl DetectionService {
    pub fn new() -> Self {
        Self {
            metrics: MetricsAnomalyDetector::new(),
            security: SecurityThreatDetector::new(),
        }
    }

    /// Train the metrics model on historical samples
    pub fn train_metrics(&self, samples: &[MetricSample]) -> DetectorResult<usize> {
        self.metrics.train(samples)
    }

    /// Score one metric sample; requires a prior successful `train_metrics`
    pub fn detect_metric(&self, sample: &MetricSample) -> DetectorResult<AnomalyResult> {
        self.metrics.detect(sample)
    }

    /// Analyze one request observation; never fails
    pub fn analyze_request(&self, request: &RequestObservation) -> ThreatAssessment {
        self.security.analyze(request)
    }

    /// Train the security model; fails closed with `false`
    pub fn train_security(&self, samples: &[SecurityTrainingSample]) -> bool {
        self.security.train(samples)
    }

    /// Current security monitoring summary
    pub fn security_summary(&self) -> SecuritySummary {
        self.security.summary()
    }

    /// Point-in-time gauges and counters for an external exporter
    pub fn telemetry(&self) -> TelemetrySnapshot {
        telemetry::snapshot()
    }

    pub fn metrics_detector(&self) -> &MetricsAnomalyDetector {
        &self.metrics
    }

    pub fn security_detector(&self) -> &SecurityThreatDetector {
        &self.security
    }
}

impl Default for DetectionService {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectorError;

    #[test]
    fn test_paths_are_independent() {
        let service = DetectionService::new();

        // training the security path leaves the metrics path untrained
        let samples: Vec<SecurityTrainingSample> = (0..20)
            .map(|i| SecurityTrainingSample {
                window_size: (i % 4) as f64,
                user_agent_length: 50.0,
                endpoint_length: 8.0,
                status_code: 200.0,
                risk_score: 0.0,
            })
            .collect();
        assert!(service.train_security(&samples));

        let sample = MetricSample {
            cpu_usage: 10.0,
            memory_usage: 20.0,
            response_time: 30.0,
            request_count: 40.0,
            error_rate: 0.5,
        };
        assert_eq!(
            service.detect_metric(&sample).unwrap_err(),
            DetectorError::ModelNotTrained
        );
    }

    #[test]
    fn test_summary_tracks_analyzed_requests() {
        let service = DetectionService::new();
        service.analyze_request(&RequestObservation {
            client_id: "1.1.1.1".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            endpoint: "/orders".to_string(),
            method: "GET".to_string(),
            status_code: 200,
            timestamp: 100.0,
        });

        let summary = service.security_detector().summary_at(110.0);
        assert_eq!(summary.total_tracked, 1);
        assert_eq!(summary.active_clients, 1);
    }
}
