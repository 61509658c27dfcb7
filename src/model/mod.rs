//! Model Module - Unsupervised outlier scoring
//!
//! ## Structure
//! - `normalizer`: per-dimension centering/scaling, fit once at training time
//! - `forest`: isolation-forest scorer with a train/score contract
//!
//! Both are immutable once fitted; detectors swap whole snapshots instead of
//! mutating a live model.

pub mod forest;
pub mod normalizer;

pub use forest::IsolationForest;
pub use normalizer::Normalizer;
