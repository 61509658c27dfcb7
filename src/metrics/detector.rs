//! Metrics Anomaly Detector
//!
//! Normalizer + isolation forest over 5-dimensional infrastructure metric
//! vectors. The fitted pair is one immutable snapshot behind an atomically
//! swapped reference: concurrent `detect` calls see the old pair or the new
//! pair in full, never a mix, and a failed `train` leaves the previous
//! snapshot installed.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::constants::{METRICS_CONTAMINATION, MIN_TRAINING_SAMPLES};
use crate::error::{DetectorError, DetectorResult};
use crate::features::FeatureVector;
use crate::model::{IsolationForest, Normalizer};
use crate::telemetry;

use super::types::{AnomalyResult, MetricSample};

/// Normalizer and forest fitted from the same batch
struct TrainedState {
    normalizer: Normalizer,
    forest: IsolationForest,
}

/// Detects anomalous infrastructure metric samples
pub struct MetricsAnomalyDetector {
    state: RwLock<Option<Arc<TrainedState>>>,
    contamination: f64,
}

impl MetricsAnomalyDetector {
    pub fn new() -> Self {
        Self::with_contamination(METRICS_CONTAMINATION)
    }

    pub fn with_contamination(contamination: f64) -> Self {
        Self {
            state: RwLock::new(None),
            contamination,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.state.read().is_some()
    }

    /// Fit the normalizer, then the forest on the normalized batch, and
    /// install both as one snapshot. Returns the number of samples used.
    pub fn train(&self, samples: &[MetricSample]) -> DetectorResult<usize> {
        if samples.is_empty() {
            return Err(DetectorError::TrainingFailed(
                "empty training batch".to_string(),
            ));
        }
        if samples.len() < MIN_TRAINING_SAMPLES {
            return Err(DetectorError::InsufficientData {
                required: MIN_TRAINING_SAMPLES,
                got: samples.len(),
            });
        }

        let vectors: Vec<FeatureVector> = samples.iter().map(|s| s.to_features()).collect();

        let mut normalizer = Normalizer::new();
        normalizer.fit(&vectors)?;
        let scaled = normalizer.transform_batch(&vectors)?;

        let mut forest = IsolationForest::new(self.contamination)?;
        forest.fit(&scaled)?;

        *self.state.write() = Some(Arc::new(TrainedState { normalizer, forest }));
        telemetry::set_metrics_model_trained(true);
        log::info!("metrics model trained with {} samples", samples.len());
        Ok(samples.len())
    }

    /// Normalize, score, and classify one sample.
    ///
    /// Fails with `ModelNotTrained` until `train` has succeeded.
    pub fn detect(&self, sample: &MetricSample) -> DetectorResult<AnomalyResult> {
        let state = self
            .state
            .read()
            .clone()
            .ok_or(DetectorError::ModelNotTrained)?;

        let scaled = state.normalizer.transform(&sample.to_features())?;
        let anomaly_score = state.forest.score(&scaled)?;
        let is_anomaly = state.forest.is_outlier(&scaled)?;

        telemetry::record_detection(is_anomaly);

        Ok(AnomalyResult {
            is_anomaly,
            anomaly_score,
            feature_values: *sample,
            timestamp: telemetry::now_epoch_secs(),
        })
    }
}

impl Default for MetricsAnomalyDetector {
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

    fn steady_samples(count: usize) -> Vec<MetricSample> {
        (0..count)
            .map(|i| MetricSample {
                cpu_usage: 40.0 + (i % 10) as f64,
                memory_usage: 60.0 + (i % 6) as f64,
                response_time: 120.0 + (i % 15) as f64,
                request_count: 900.0 + (i % 50) as f64,
                error_rate: 0.01 + (i % 4) as f64 * 0.005,
            })
            .collect()
    }

    #[test]
    fn test_detect_before_train_fails() {
        let detector = MetricsAnomalyDetector::new();
        let sample = steady_samples(1)[0];
        assert_eq!(
            detector.detect(&sample).unwrap_err(),
            DetectorError::ModelNotTrained
        );
    }

    #[test]
    fn test_train_rejects_empty_batch() {
        let detector = MetricsAnomalyDetector::new();
        assert!(matches!(
            detector.train(&[]).unwrap_err(),
            DetectorError::TrainingFailed(_)
        ));
        assert!(!detector.is_trained());
    }

    #[test]
    fn test_train_rejects_undersized_batch() {
        let detector = MetricsAnomalyDetector::new();
        let err = detector.train(&steady_samples(4)).unwrap_err();
        assert_eq!(
            err,
            DetectorError::InsufficientData {
                required: MIN_TRAINING_SAMPLES,
                got: 4
            }
        );
    }

    #[test]
    fn test_failed_retrain_keeps_previous_snapshot() {
        let detector = MetricsAnomalyDetector::new();
        detector.train(&steady_samples(50)).unwrap();
        let sample = steady_samples(1)[0];
        let before = detector.detect(&sample).unwrap();

        assert!(detector.train(&steady_samples(2)).is_err());
        assert!(detector.is_trained());
        let after = detector.detect(&sample).unwrap();
        assert_eq!(before.anomaly_score, after.anomaly_score);
    }

    #[test]
    fn test_extreme_sample_is_anomalous() {
        let detector = MetricsAnomalyDetector::new();
        detector.train(&steady_samples(60)).unwrap();

        let spike = MetricSample {
            cpu_usage: 99.0,
            memory_usage: 98.0,
            response_time: 5000.0,
            request_count: 20.0,
            error_rate: 0.9,
        };
        let result = detector.detect(&spike).unwrap();
        assert!(result.is_anomaly);
        assert!(result.anomaly_score < 0.0);
    }

    #[test]
    fn test_detect_is_deterministic_for_fixed_snapshot() {
        let detector = MetricsAnomalyDetector::new();
        detector.train(&steady_samples(60)).unwrap();

        let sample = steady_samples(7)[6];
        let a = detector.detect(&sample).unwrap();
        let b = detector.detect(&sample).unwrap();
        assert_eq!(a.anomaly_score, b.anomaly_score);
        assert_eq!(a.is_anomaly, b.is_anomaly);
    }
}
