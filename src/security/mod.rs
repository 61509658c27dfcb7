//! Security Module - Request threat analysis
//!
//! Fuses deterministic rules with an optional trained model into one risk
//! score per request.
//!
//! ## Structure
//! - `types`: observations, assessments, training samples (no logic)
//! - `rules`: weights, denylists, configurable thresholds
//! - `engine`: tracker updates, rule evaluation, model fusion

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::SecurityThreatDetector;
pub use rules::RuleThresholds;
pub use types::{RequestObservation, SecuritySummary, SecurityTrainingSample, ThreatAssessment};
