// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramVec, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total number of label requests
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("requests_total", "Total number of label requests"),
        &["endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // GEMINI API METRICS
    // ============================================================================

    /// Total Gemini API calls
    pub static ref GEMINI_API_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gemini_api_calls_total", "Total Gemini API calls"),
        &["model", "status_code"],
        REGISTRY
    ).unwrap();

    /// Gemini API call duration
    pub static ref GEMINI_API_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("gemini_api_duration_seconds", "Gemini API call duration")
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["model"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // SPEECH METRICS
    // ============================================================================

    /// TTS chunk requests
    pub static ref TTS_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("tts_calls_total", "Total text-to-speech chunk requests"),
        &["status"], // status: success, error
        REGISTRY
    ).unwrap();

    // ============================================================================
    // PIPELINE METRICS
    // ============================================================================

    /// Pipeline failures by stage
    pub static ref PIPELINE_FAILURES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("pipeline_failures_total", "Pipeline failures by stage and error type"),
        &["stage", "error_type"], // stage: normalize, interpret, synthesize
        REGISTRY
    ).unwrap();

    /// Narrations that used the default summary sentence
    pub static ref SUMMARY_FALLBACKS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("summary_fallbacks_total", "Narrations that fell back to the default summary"),
        &["model"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Vec metrics only show up once a label set has been observed
        REQUESTS_TOTAL.with_label_values(&["/api/interpret", "200"]).inc();
        GEMINI_API_CALLS.with_label_values(&["gemini-1.5-flash", "200"]).inc();
        TTS_CALLS.with_label_values(&["success"]).inc();
        PIPELINE_FAILURES.with_label_values(&["interpret", "malformed_response"]).inc();

        let metrics = gather_metrics();
        assert!(metrics.contains("requests_total"));
        assert!(metrics.contains("gemini_api_calls_total"));
        assert!(metrics.contains("tts_calls_total"));
        assert!(metrics.contains("pipeline_failures_total"));
    }
}
