//! Feature Normalizer
//!
//! Per-dimension centering and scaling, computed once from a training batch
//! and applied identically at scoring time. Identical input batches always
//! yield identical parameters.

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, DetectorResult};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Fitted per-dimension parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalingParams {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

/// Standard-score normalizer
///
/// `transform` fails with `NormalizerNotFit` until `fit` has succeeded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Normalizer {
    params: Option<ScalingParams>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self { params: None }
    }

    pub fn is_fit(&self) -> bool {
        self.params.is_some()
    }

    /// Compute per-dimension mean and standard deviation from the batch.
    ///
    /// A zero deviation is replaced by 1.0 so constant dimensions pass
    /// through centered instead of dividing by zero.
    pub fn fit(&mut self, samples: &[FeatureVector]) -> DetectorResult<()> {
        if samples.is_empty() {
            return Err(DetectorError::TrainingFailed(
                "empty normalizer batch".to_string(),
            ));
        }

        let n = samples.len() as f64;
        let mut mean = [0.0f64; FEATURE_COUNT];
        let mut scale = [0.0f64; FEATURE_COUNT];

        for sample in samples {
            for (i, value) in sample.values().iter().enumerate() {
                mean[i] += value;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        for sample in samples {
            for (i, value) in sample.values().iter().enumerate() {
                scale[i] += (value - mean[i]).powi(2);
            }
        }
        for s in scale.iter_mut() {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        self.params = Some(ScalingParams { mean, scale });
        Ok(())
    }

    /// Apply `(x_i - mean_i) / scale_i` per dimension
    pub fn transform(&self, x: &FeatureVector) -> DetectorResult<FeatureVector> {
        let params = self.params.as_ref().ok_or(DetectorError::NormalizerNotFit)?;

        let mut out = [0.0f64; FEATURE_COUNT];
        for (i, value) in x.values().iter().enumerate() {
            out[i] = (value - params.mean[i]) / params.scale[i];
        }
        Ok(FeatureVector::new(out))
    }

    pub fn transform_batch(&self, samples: &[FeatureVector]) -> DetectorResult<Vec<FeatureVector>> {
        samples.iter().map(|s| self.transform(s)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<FeatureVector> {
        vec![
            FeatureVector::new([0.0, 10.0, 5.0, 1.0, 0.0]),
            FeatureVector::new([2.0, 10.0, 7.0, 3.0, 0.0]),
            FeatureVector::new([4.0, 10.0, 9.0, 5.0, 0.0]),
        ]
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let normalizer = Normalizer::new();
        let x = FeatureVector::new([1.0; 5]);
        assert_eq!(
            normalizer.transform(&x).unwrap_err(),
            DetectorError::NormalizerNotFit
        );
    }

    #[test]
    fn test_fit_rejects_empty_batch() {
        let mut normalizer = Normalizer::new();
        assert!(matches!(
            normalizer.fit(&[]).unwrap_err(),
            DetectorError::TrainingFailed(_)
        ));
    }

    #[test]
    fn test_transform_centers_and_scales() {
        let mut normalizer = Normalizer::new();
        normalizer.fit(&batch()).unwrap();

        let mid = normalizer
            .transform(&FeatureVector::new([2.0, 10.0, 7.0, 3.0, 0.0]))
            .unwrap();
        for value in mid.values() {
            assert!(value.abs() < 1e-9);
        }

        // dimension 0: mean 2, population std sqrt(8/3)
        let hi = normalizer
            .transform(&FeatureVector::new([4.0, 10.0, 7.0, 3.0, 0.0]))
            .unwrap();
        assert!((hi[0] - 2.0 / (8.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_deviation_falls_back_to_unit_scale() {
        let mut normalizer = Normalizer::new();
        normalizer.fit(&batch()).unwrap();

        // dimension 1 is constant at 10.0, so it only gets centered
        let x = normalizer
            .transform(&FeatureVector::new([0.0, 13.0, 5.0, 1.0, 0.0]))
            .unwrap();
        assert!((x[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let mut a = Normalizer::new();
        let mut b = Normalizer::new();
        a.fit(&batch()).unwrap();
        b.fit(&batch()).unwrap();

        let x = FeatureVector::new([1.5, 2.5, 3.5, 4.5, 5.5]);
        assert_eq!(a.transform(&x).unwrap(), b.transform(&x).unwrap());
    }
}
