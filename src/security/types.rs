//! Security Types
//!
//! Data structures for the request-analysis path. No logic here.

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

// ============================================================================
// REQUEST OBSERVATION
// ============================================================================

/// One observed HTTP request, as reported by the transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestObservation {
    pub client_id: String,
    pub user_agent: String,
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    /// Epoch seconds
    pub timestamp: f64,
}

// ============================================================================
// THREAT ASSESSMENT
// ============================================================================

/// Result of analyzing a single request. Pure value, produced fresh per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    /// Human-readable threat descriptions, in rule order
    pub threats: Vec<String>,
    /// Fused risk in [0, 1]
    pub risk_score: f64,
    /// `risk_score > 0.5`, fixed threshold
    pub is_threat: bool,
    pub client_id: String,
    pub timestamp: f64,
}

// ============================================================================
// TRAINING SAMPLE
// ============================================================================

/// One historical sample for the security model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityTrainingSample {
    pub window_size: f64,
    pub user_agent_length: f64,
    pub endpoint_length: f64,
    pub status_code: f64,
    pub risk_score: f64,
}

impl SecurityTrainingSample {
    /// Feature order must match the vector built at analysis time
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector::new([
            self.window_size,
            self.user_agent_length,
            self.endpoint_length,
            self.status_code,
            self.risk_score,
        ])
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Snapshot of the security monitor's current state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySummary {
    /// Clients seen within the last window span
    pub active_clients: usize,
    /// Clients currently over the per-minute request threshold
    pub high_risk_clients: usize,
    /// Lifetime count of analyzed requests
    pub total_tracked: u64,
    pub model_trained: bool,
}
