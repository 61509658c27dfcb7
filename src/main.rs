//! AI Sentinel - Daemon entry point
//!
//! Polls a Prometheus-compatible source, bootstraps the metrics model from
//! the first collected batch, then scores every subsequent sample. The
//! security path is driven by the transport layer through
//! `DetectionService`; this loop only exercises the metrics path.

use std::time::Duration;

use ai_sentinel_core::constants::{self, APP_NAME, APP_VERSION};
use ai_sentinel_core::{DetectionService, DetectorError, MetricSample, MetricsCollector};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let service = DetectionService::new();
    let collector = MetricsCollector::new(constants::get_metrics_url());
    let interval = Duration::from_secs(constants::get_poll_interval_secs());
    let bootstrap_target = constants::get_bootstrap_samples();

    let mut bootstrap: Vec<MetricSample> = Vec::with_capacity(bootstrap_target);

    loop {
        tokio::time::sleep(interval).await;

        let sample = match collector.fetch_sample().await {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                log::debug!("metrics source returned no data");
                continue;
            }
            Err(e) => {
                log::warn!("metrics fetch failed: {e}");
                continue;
            }
        };

        if !service.metrics_detector().is_trained() {
            bootstrap.push(sample);
            log::debug!(
                "bootstrapping metrics model: {}/{} samples",
                bootstrap.len(),
                bootstrap_target
            );
            if bootstrap.len() >= bootstrap_target {
                match service.train_metrics(&bootstrap) {
                    Ok(count) => {
                        log::info!("metrics model bootstrapped from {count} samples");
                        bootstrap.clear();
                    }
                    Err(e) => log::error!("bootstrap training failed: {e}"),
                }
            }
            continue;
        }

        match service.detect_metric(&sample) {
            Ok(result) if result.is_anomaly => log::warn!(
                "metric anomaly detected (score {:.3}): cpu {:.1}%, mem {:.1}%, p95 {:.0}ms, err {:.3}",
                result.anomaly_score,
                sample.cpu_usage,
                sample.memory_usage,
                sample.response_time,
                sample.error_rate
            ),
            Ok(result) => log::debug!("metric sample in range (score {:.3})", result.anomaly_score),
            Err(DetectorError::ModelNotTrained) => log::debug!("metrics model not trained yet"),
            Err(e) => log::error!("metric detection failed: {e}"),
        }
    }
}
