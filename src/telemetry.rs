//! Telemetry
//!
//! Process-wide gauges and counters updated as side effects of `detect` and
//! `analyze`. An external exporter scrapes the snapshot; the core never
//! formats or serves an exposition format.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// STATE
// ============================================================================

static DETECTIONS_TOTAL: AtomicU64 = AtomicU64::new(0);
static ANOMALIES_DETECTED: AtomicU64 = AtomicU64::new(0);
static ANALYSES_TOTAL: AtomicU64 = AtomicU64::new(0);
static THREATS_DETECTED: AtomicU64 = AtomicU64::new(0);

/// f64 bits of the most recent risk score
static LAST_RISK_SCORE_BITS: AtomicU64 = AtomicU64::new(0);
static ACTIVE_CLIENTS: AtomicU64 = AtomicU64::new(0);

static METRICS_MODEL_TRAINED: AtomicBool = AtomicBool::new(false);
static SECURITY_MODEL_TRAINED: AtomicBool = AtomicBool::new(false);

// ============================================================================
// RECORDING
// ============================================================================

pub fn record_detection(is_anomaly: bool) {
    DETECTIONS_TOTAL.fetch_add(1, Ordering::Relaxed);
    if is_anomaly {
        ANOMALIES_DETECTED.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn record_analysis(risk_score: f64, is_threat: bool) {
    ANALYSES_TOTAL.fetch_add(1, Ordering::Relaxed);
    if is_threat {
        THREATS_DETECTED.fetch_add(1, Ordering::Relaxed);
    }
    LAST_RISK_SCORE_BITS.store(risk_score.to_bits(), Ordering::Relaxed);
}

pub fn set_active_clients(count: usize) {
    ACTIVE_CLIENTS.store(count as u64, Ordering::Relaxed);
}

pub fn set_metrics_model_trained(trained: bool) {
    METRICS_MODEL_TRAINED.store(trained, Ordering::Relaxed);
}

pub fn set_security_model_trained(trained: bool) {
    SECURITY_MODEL_TRAINED.store(trained, Ordering::Relaxed);
}

/// Zero every counter and gauge (test hook)
pub fn reset() {
    DETECTIONS_TOTAL.store(0, Ordering::Relaxed);
    ANOMALIES_DETECTED.store(0, Ordering::Relaxed);
    ANALYSES_TOTAL.store(0, Ordering::Relaxed);
    THREATS_DETECTED.store(0, Ordering::Relaxed);
    LAST_RISK_SCORE_BITS.store(0, Ordering::Relaxed);
    ACTIVE_CLIENTS.store(0, Ordering::Relaxed);
    METRICS_MODEL_TRAINED.store(false, Ordering::Relaxed);
    SECURITY_MODEL_TRAINED.store(false, Ordering::Relaxed);
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Point-in-time view of all gauges and counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub detections_total: u64,
    pub anomalies_detected_total: u64,
    pub analyses_total: u64,
    pub security_threats_total: u64,
    pub last_risk_score: f64,
    pub active_clients: u64,
    pub metrics_model_trained: bool,
    pub security_model_trained: bool,
}

pub fn snapshot() -> TelemetrySnapshot {
    TelemetrySnapshot {
        detections_total: DETECTIONS_TOTAL.load(Ordering::Relaxed),
        anomalies_detected_total: ANOMALIES_DETECTED.load(Ordering::Relaxed),
        analyses_total: ANALYSES_TOTAL.load(Ordering::Relaxed),
        security_threats_total: THREATS_DETECTED.load(Ordering::Relaxed),
        last_risk_score: f64::from_bits(LAST_RISK_SCORE_BITS.load(Ordering::Relaxed)),
        active_clients: ACTIVE_CLIENTS.load(Ordering::Relaxed),
        metrics_model_trained: METRICS_MODEL_TRAINED.load(Ordering::Relaxed),
        security_model_trained: SECURITY_MODEL_TRAINED.load(Ordering::Relaxed),
    }
}

/// Current wall clock as epoch seconds
pub fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

// ============================================================================
// TESTS
// ============================================================================
