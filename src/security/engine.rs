//! Security Threat Detector
//!
//! Deterministic rule evaluation fused with an optional model signal.
//!
//! Rules run in a fixed order because the model stage scores a feature
//! vector that includes the risk accumulated by the rules before it.
//! `analyze` never fails: malformed input degrades to "no match" and a model
//! error degrades to rule-only scoring.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::constants::{MIN_TRAINING_SAMPLES, SECURITY_CONTAMINATION, THREAT_THRESHOLD};
use crate::features::FeatureVector;
use crate::model::IsolationForest;
use crate::telemetry;
use crate::tracker::ClientActivityTracker;

use super::rules::{
    self, RuleThresholds, ERROR_RATE_WEIGHT, HIGH_RATE_WEIGHT, MODEL_ANOMALY_WEIGHT,
    SENSITIVE_ENDPOINT_WEIGHT, SUSPICIOUS_AGENT_WEIGHT, UNUSUAL_METHOD_WEIGHT,
};
use super::types::{RequestObservation, SecuritySummary, SecurityTrainingSample, ThreatAssessment};

/// Analyzes request observations for attack patterns
pub struct SecurityThreatDetector {
    tracker: ClientActivityTracker,
    /// Trained model snapshot, swapped wholesale on retrain
    model: RwLock<Option<Arc<IsolationForest>>>,
    thresholds: RuleThresholds,
}

impl SecurityThreatDetector {
    pub fn new() -> Self {
        Self::with_thresholds(RuleThresholds::default())
    }

    pub fn with_thresholds(thresholds: RuleThresholds) -> Self {
        Self {
            tracker: ClientActivityTracker::new(),
            model: RwLock::new(None),
            thresholds,
        }
    }

    pub fn tracker(&self) -> &ClientActivityTracker {
        &self.tracker
    }

    pub fn is_trained(&self) -> bool {
        self.model.read().is_some()
    }

    /// Analyze one request: update tracker state, evaluate rules in order,
    /// optionally consult the model, and return a fresh assessment.
    pub fn analyze(&self, request: &RequestObservation) -> ThreatAssessment {
        let mut threats = Vec::new();
        let mut risk = 0.0f64;

        let window_size = self.tracker.record(&request.client_id, request.timestamp);

        // Rule 1: denylisted user agent
        if let Some(fragment) = rules::match_suspicious_agent(&request.user_agent) {
            threats.push(format!("Suspicious user agent detected: {fragment}"));
            risk += SUSPICIOUS_AGENT_WEIGHT;
        }

        // Rule 2: request rate over the per-minute threshold
        if window_size > self.thresholds.max_requests_per_minute {
            threats.push(format!(
                "High request rate from client: {window_size} requests/min"
            ));
            risk += HIGH_RATE_WEIGHT;
        }

        // Rule 3: sensitive endpoint fragment
        if rules::match_sensitive_endpoint(&request.endpoint).is_some() {
            threats.push(format!("Suspicious endpoint access: {}", request.endpoint));
            risk += SENSITIVE_ENDPOINT_WEIGHT;
        }

        // Rule 4: method outside the allowed set
        if !rules::is_allowed_method(&request.method) {
            threats.push(format!("Unusual HTTP method: {}", request.method));
            risk += UNUSUAL_METHOD_WEIGHT;
        }

        // Rule 5: repeated errors on this (client, endpoint) pair
        if request.status_code >= 400 {
            let errors = self
                .tracker
                .record_error(&request.client_id, &request.endpoint);
            if errors > self.thresholds.error_count_threshold {
                threats.push(format!(
                    "High error rate for {} on {}",
                    request.client_id, request.endpoint
                ));
                risk += ERROR_RATE_WEIGHT;
            }
        }

        // Rule 6: model signal over [window, ua len, endpoint len, status,
        // risk so far] - the vector depends on the rules above, so this
        // stage must stay last.
        let model = self.model.read().clone();
        if let Some(forest) = model {
            if window_size > 0 {
                let features = FeatureVector::new([
                    window_size as f64,
                    request.user_agent.len() as f64,
                    request.endpoint.len() as f64,
                    f64::from(request.status_code),
                    risk,
                ]);
                match forest
                    .score(&features)
                    .and_then(|score| Ok((score, forest.is_outlier(&features)?)))
                {
                    Ok((score, true)) => {
                        threats.push(format!(
                            "Model-detected security anomaly (score: {score:.3})"
                        ));
                        risk += MODEL_ANOMALY_WEIGHT;
                    }
                    Ok((_, false)) => {}
                    Err(e) => log::warn!("security model scoring failed: {e}"),
                }
            }
        }

        let risk_score = risk.min(1.0);
        let is_threat = risk_score > THREAT_THRESHOLD;

        telemetry::record_analysis(risk_score, is_threat);
        telemetry::set_active_clients(self.tracker.active_client_count(request.timestamp));

        ThreatAssessment {
            threats,
            risk_score,
            is_threat,
            client_id: request.client_id.clone(),
            timestamp: request.timestamp,
        }
    }

    /// Train the security model on historical samples.
    ///
    /// Fails closed: under-sized or unfittable batches return `false` and
    /// leave any previously installed model untouched.
    pub fn train(&self, samples: &[SecurityTrainingSample]) -> bool {
        if samples.len() < MIN_TRAINING_SAMPLES {
            log::warn!(
                "insufficient data for security model training: {} < {}",
                samples.len(),
                MIN_TRAINING_SAMPLES
            );
            return false;
        }

        let features: Vec<FeatureVector> = samples.iter().map(|s| s.to_features()).collect();

        let mut forest = match IsolationForest::new(SECURITY_CONTAMINATION) {
            Ok(forest) => forest,
            Err(e) => {
                log::error!("security model setup failed: {e}");
                return false;
            }
        };
        if let Err(e) = forest.fit(&features) {
            log::error!("security model training failed: {e}");
            return false;
        }

        *self.model.write() = Some(Arc::new(forest));
        telemetry::set_security_model_trained(true);
        log::info!("security model trained with {} samples", samples.len());
        true
    }

    /// Summary relative to the current wall clock
    pub fn summary(&self) -> SecuritySummary {
        self.summary_at(telemetry::now_epoch_secs())
    }

    /// Summary relative to an explicit reference time
    pub fn summary_at(&self, now: f64) -> SecuritySummary {
        SecuritySummary {
            active_clients: self.tracker.active_client_count(now),
            high_risk_clients: self
                .tracker
                .high_activity_client_count(self.thresholds.max_requests_per_minute),
            total_tracked: self.tracker.total_recorded(),
            model_trained: self.is_trained(),
        }
    }

    /// Drop all tracked activity (windows and error counters)
    pub fn reset(&self) {
        self.tracker.reset();
    }
}

impl Default for SecurityThreatDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
