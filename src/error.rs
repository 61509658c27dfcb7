//! Error handling
//!
//! One taxonomy for both detection paths. Training failures never leave a
//! detector in a partially-trained state; scoring failures are reported
//! synchronously to the caller.

use thiserror::Error;

pub type DetectorResult<T> = Result<T, DetectorError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    /// Training batch too small
    #[error("insufficient training data: required {required} samples, got {got}")]
    InsufficientData { required: usize, got: usize },

    /// Scoring requested before a successful fit
    #[error("model has not been trained")]
    ModelNotTrained,

    /// Transform requested before the normalizer was fit
    #[error("normalizer has not been fit")]
    NormalizerNotFit,

    /// Malformed or empty training batch
    #[error("training failed: {0}")]
    TrainingFailed(String),

    /// Feature dimensionality mismatch
    #[error("invalid feature vector: expected {expected} dimensions, got {got}")]
    InvalidFeatureVector { expected: usize, got: usize },
}
