//! Feature Vector - Core data structure for model input
//!
//! Both detection paths score fixed-width 5-dimensional vectors. Ordering is
//! significant and must match between training and scoring, so the layouts
//! are pinned here next to the type.

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, DetectorResult};

/// Dimensionality shared by both detectors
pub const FEATURE_COUNT: usize = 5;

/// Feature order for the infrastructure-metrics path
pub const METRIC_FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "cpu_usage",
    "memory_usage",
    "response_time",
    "request_count",
    "error_rate",
];

/// Feature order for the security path
pub const SECURITY_FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "window_size",
    "user_agent_length",
    "endpoint_length",
    "status_code",
    "risk_score",
];

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Fixed-width, ordered feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from a runtime-sized slice, rejecting dimension mismatches
    pub fn from_slice(values: &[f64]) -> DetectorResult<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(DetectorError::InvalidFeatureVector {
                expected: FEATURE_COUNT,
                got: values.len(),
            });
        }
        let mut array = [0.0f64; FEATURE_COUNT];
        array.copy_from_slice(values);
        Ok(Self { values: array })
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::new(values)
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_accepts_exact_width() {
        let vector = FeatureVector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(vector.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(vector[3], 4.0);
    }

    #[test]
    fn test_from_slice_rejects_dimension_mismatch() {
        let err = FeatureVector::from_slice(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            DetectorError::InvalidFeatureVector {
                expected: FEATURE_COUNT,
                got: 2
            }
        );
    }

    #[test]
    fn test_layouts_cover_all_dimensions() {
        assert_eq!(METRIC_FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(SECURITY_FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }
}
