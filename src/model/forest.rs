//! Isolation Forest - Unsupervised outlier scorer
//!
//! Ensemble of random isolation trees over fixed-width feature vectors.
//! Outliers isolate in fewer splits, so short average path lengths mean
//! anomalous points.
//!
//! Contract:
//! - `fit` needs at least `MIN_TRAINING_SAMPLES` vectors and a contamination
//!   fraction in (0, 1); a failed fit leaves any previous trained state
//!   untouched.
//! - `score` returns a continuous decision value, more negative = more
//!   anomalous (decision offset taken at the contamination quantile of the
//!   training scores).
//! - `is_outlier` is true iff the decision value is negative.
//!
//! Sampling is seeded, so refitting the same batch rebuilds the same forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{FOREST_SEED, FOREST_SUBSAMPLE_SIZE, FOREST_TREE_COUNT, MIN_TRAINING_SAMPLES};
use crate::error::{DetectorError, DetectorResult};
use crate::features::{FeatureVector, FEATURE_COUNT};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over n points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// ISOLATION TREE
// ============================================================================

#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn build(data: &[&FeatureVector], height_limit: usize, rng: &mut StdRng) -> Self {
        Self {
            root: Self::build_node(data, 0, height_limit, rng),
        }
    }

    fn build_node(
        data: &[&FeatureVector],
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Node {
        if depth >= height_limit || data.len() <= 1 {
            return Node::Leaf { size: data.len() };
        }

        // Only features with spread can split the partition
        let mut candidates = Vec::with_capacity(FEATURE_COUNT);
        for feature in 0..FEATURE_COUNT {
            let (min, max) = Self::feature_range(data, feature);
            if min < max {
                candidates.push((feature, min, max));
            }
        }
        if candidates.is_empty() {
            return Node::Leaf { size: data.len() };
        }

        let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
        let value = rng.gen_range(min..max);

        let mut left = Vec::new();
        let mut right = Vec::new();
        for sample in data {
            if sample[feature] < value {
                left.push(*sample);
            } else {
                right.push(*sample);
            }
        }

        Node::Split {
            feature,
            value,
            left: Box::new(Self::build_node(&left, depth + 1, height_limit, rng)),
            right: Box::new(Self::build_node(&right, depth + 1, height_limit, rng)),
        }
    }

    fn feature_range(data: &[&FeatureVector], feature: usize) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for sample in data {
            let value = sample[feature];
            min = min.min(value);
            max = max.max(value);
        }
        (min, max)
    }

    fn path_length(&self, x: &FeatureVector) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;
        loop {
            match node {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split {
                    feature,
                    value,
                    left,
                    right,
                } => {
                    node = if x[*feature] < *value { left } else { right };
                    depth += 1;
                }
            }
        }
    }
}

// ============================================================================
// ISOLATION FOREST
// ============================================================================

#[derive(Debug)]
struct ForestState {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    /// Decision offset at the contamination quantile of the training scores
    offset: f64,
}

/// Trainable outlier scorer
///
/// Scoring before a successful `fit` fails with `ModelNotTrained`.
#[derive(Debug)]
pub struct IsolationForest {
    contamination: f64,
    state: Option<ForestState>,
}

impl IsolationForest {
    pub fn new(contamination: f64) -> DetectorResult<Self> {
        if !(contamination > 0.0 && contamination < 1.0) {
            return Err(DetectorError::TrainingFailed(format!(
                "contamination must be in (0, 1), got {contamination}"
            )));
        }
        Ok(Self {
            contamination,
            state: None,
        })
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Build the ensemble and fix the decision offset.
    ///
    /// The trained state is replaced wholesale on success; every failure path
    /// returns before the previous state is touched.
    pub fn fit(&mut self, samples: &[FeatureVector]) -> DetectorResult<()> {
        if samples.len() < MIN_TRAINING_SAMPLES {
            return Err(DetectorError::InsufficientData {
                required: MIN_TRAINING_SAMPLES,
                got: samples.len(),
            });
        }

        let n = samples.len();
        let sample_size = FOREST_SUBSAMPLE_SIZE.min(n);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(FOREST_SEED);

        let mut trees = Vec::with_capacity(FOREST_TREE_COUNT);
        for _ in 0..FOREST_TREE_COUNT {
            let subsample: Vec<&FeatureVector> = rand::seq::index::sample(&mut rng, n, sample_size)
                .iter()
                .map(|i| &samples[i])
                .collect();
            trees.push(IsolationTree::build(&subsample, height_limit, &mut rng));
        }

        let mut state = ForestState {
            trees,
            sample_size,
            offset: 0.0,
        };

        // Offset = contamination quantile of training scores, so the bottom
        // contamination fraction of the batch lands below zero.
        let mut training_scores: Vec<f64> =
            samples.iter().map(|s| Self::raw_score(&state, s)).collect();
        training_scores.sort_by(f64::total_cmp);
        let rank = ((1.0 - self.contamination) * n as f64).ceil() as usize;
        state.offset = training_scores[rank.clamp(1, n) - 1];

        self.state = Some(state);
        Ok(())
    }

    /// Raw isolation score in (0, 1]; higher = more isolated
    fn raw_score(state: &ForestState, x: &FeatureVector) -> f64 {
        let total: f64 = state.trees.iter().map(|t| t.path_length(x)).sum();
        let avg_path = total / state.trees.len() as f64;
        let c = average_path_length(state.sample_size).max(f64::EPSILON);
        2.0f64.powf(-avg_path / c)
    }

    /// Continuous decision value; more negative = more anomalous
    pub fn score(&self, x: &FeatureVector) -> DetectorResult<f64> {
        let state = self.state.as_ref().ok_or(DetectorError::ModelNotTrained)?;
        Ok(state.offset - Self::raw_score(state, x))
    }

    /// True iff the point falls in the bottom contamination fraction of
    /// normality as judged by the fitted ensemble
    pub fn is_outlier(&self, x: &FeatureVector) -> DetectorResult<bool> {
        Ok(self.score(x)? < 0.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(count: usize) -> Vec<FeatureVector> {
        (0..count)
            .map(|i| {
                FeatureVector::new([
                    (i % 5) as f64,
                    10.0 + (i % 7) as f64,
                    100.0 + (i % 3) as f64,
                    (i % 4) as f64,
                    0.5 + (i % 2) as f64 * 0.1,
                ])
            })
            .collect()
    }

    #[test]
    fn test_score_before_fit_fails() {
        let forest = IsolationForest::new(0.1).unwrap();
        let x = FeatureVector::new([0.0; 5]);
        assert_eq!(forest.score(&x).unwrap_err(), DetectorError::ModelNotTrained);
        assert_eq!(
            forest.is_outlier(&x).unwrap_err(),
            DetectorError::ModelNotTrained
        );
    }

    #[test]
    fn test_invalid_contamination_rejected() {
        assert!(matches!(
            IsolationForest::new(0.0).unwrap_err(),
            DetectorError::TrainingFailed(_)
        ));
        assert!(matches!(
            IsolationForest::new(1.0).unwrap_err(),
            DetectorError::TrainingFailed(_)
        ));
    }

    #[test]
    fn test_fit_requires_minimum_samples() {
        let mut forest = IsolationForest::new(0.1).unwrap();
        let err = forest.fit(&cluster(5)).unwrap_err();
        assert_eq!(
            err,
            DetectorError::InsufficientData {
                required: MIN_TRAINING_SAMPLES,
                got: 5
            }
        );
        assert!(!forest.is_trained());
    }

    #[test]
    fn test_failed_refit_keeps_previous_model() {
        let mut forest = IsolationForest::new(0.1).unwrap();
        forest.fit(&cluster(40)).unwrap();
        let probe = FeatureVector::new([1.0, 11.0, 101.0, 1.0, 0.5]);
        let before = forest.score(&probe).unwrap();

        assert!(forest.fit(&cluster(3)).is_err());
        assert!(forest.is_trained());
        assert_eq!(forest.score(&probe).unwrap(), before);
    }

    #[test]
    fn test_scoring_is_deterministic_across_refits() {
        let samples = cluster(50);
        let probe = FeatureVector::new([3.0, 12.0, 102.0, 2.0, 0.6]);

        let mut a = IsolationForest::new(0.1).unwrap();
        let mut b = IsolationForest::new(0.1).unwrap();
        a.fit(&samples).unwrap();
        b.fit(&samples).unwrap();

        assert_eq!(a.score(&probe).unwrap(), b.score(&probe).unwrap());
    }

    #[test]
    fn test_far_point_is_flagged() {
        let mut forest = IsolationForest::new(0.1).unwrap();
        forest.fit(&cluster(60)).unwrap();

        let far = FeatureVector::new([1000.0, -500.0, 9999.0, 800.0, 50.0]);
        assert!(forest.is_outlier(&far).unwrap());
        assert!(forest.score(&far).unwrap() < 0.0);
    }

    #[test]
    fn test_training_flag_rate_bounded_by_contamination() {
        let samples = cluster(60);
        let mut forest = IsolationForest::new(0.1).unwrap();
        forest.fit(&samples).unwrap();

        let flagged = samples
            .iter()
            .filter(|s| forest.is_outlier(s).unwrap())
            .count();
        // offset sits at the contamination quantile of the training scores
        assert!(flagged <= 6, "flagged {flagged} of 60 training points");
    }
}
