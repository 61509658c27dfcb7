//! Metrics Collector
//!
//! Thin async client for a Prometheus-compatible time-series store. This is
//! the only suspension point in the crate: it fetches instant-query results
//! and maps them into `MetricSample`s for the metrics detector. Scoring
//! itself never touches the network.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::DetectorResult;
use crate::features::FeatureVector;
use crate::metrics::MetricSample;

/// Instant queries feeding the five metric dimensions, in feature order
pub const METRIC_QUERIES: [&str; 5] = [
    "avg(rate(process_cpu_seconds_total[5m])) * 100",
    "avg(process_resident_memory_bytes) / 1024 / 1024",
    "histogram_quantile(0.95, sum(rate(http_request_duration_seconds_bucket[5m])) by (le)) * 1000",
    "sum(rate(http_requests_total[5m])) * 60",
    "sum(rate(http_requests_total{status=~\"5..\"}[5m])) / sum(rate(http_requests_total[5m]))",
];

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    data: QueryData,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(default)]
    result: Vec<QuerySeries>,
}

/// One series of an instant-query result vector
#[derive(Debug, Clone, Deserialize)]
pub struct QuerySeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    /// `[epoch_seconds, "value"]`
    pub value: (f64, String),
}

impl QuerySeries {
    pub fn parsed_value(&self) -> Option<f64> {
        self.value.1.parse().ok()
    }
}

// ============================================================================
// COLLECTOR
// ============================================================================

/// Async client for the metrics source
pub struct MetricsCollector {
    client: reqwest::Client,
    base_url: String,
}

impl MetricsCollector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Run one instant query and return its result vector
    pub async fn query(&self, expr: &str) -> Result<Vec<QuerySeries>, reqwest::Error> {
        let url = format!("{}/api/v1/query", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", expr)])
            .send()
            .await?
            .error_for_status()?;

        let body: QueryResponse = response.json().await?;
        if body.status != "success" {
            log::warn!("metrics source returned status {:?} for {expr}", body.status);
            return Ok(Vec::new());
        }
        Ok(body.data.result)
    }

    /// Fetch one current `MetricSample`.
    ///
    /// Returns `Ok(None)` when the source has no data for any query; a query
    /// with no series contributes 0.0 otherwise.
    pub async fn fetch_sample(&self) -> Result<Option<MetricSample>, reqwest::Error> {
        let mut values = Vec::with_capacity(METRIC_QUERIES.len());
        let mut any_data = false;

        for expr in METRIC_QUERIES {
            let series = self.query(expr).await?;
            let value = series.first().and_then(QuerySeries::parsed_value);
            if value.is_some() {
                any_data = true;
            }
            values.push(value.unwrap_or(0.0));
        }

        if !any_data {
            return Ok(None);
        }

        match sample_from_values(&values) {
            Ok(sample) => Ok(Some(sample)),
            Err(e) => {
                log::error!("metrics mapping failed: {e}");
                Ok(None)
            }
        }
    }
}

/// Map raw query values (in `METRIC_QUERIES` order) to a sample
pub fn sample_from_values(values: &[f64]) -> DetectorResult<MetricSample> {
    let vector = FeatureVector::from_slice(values)?;
    Ok(MetricSample {
        cpu_usage: vector[0],
        memory_usage: vector[1],
        response_time: vector[2],
        request_count: vector[3],
        error_rate: vector[4],
    })
}

// ============================================================================
// TESTS
// ============================================================================
