// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
    GEMINI_API_CALLS,
    GEMINI_API_DURATION,
    TTS_CALLS,
    PIPELINE_FAILURES,
    SUMMARY_FALLBACKS,
};

/// Helper to record request metrics
pub fn record_request(endpoint: &str, status_code: u16, duration_secs: f64) {
    let status = status_code.to_string();
    REQUESTS_TOTAL
        .with_label_values(&[endpoint, &status])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[endpoint, &status])
        .observe(duration_secs);
}

/// Helper to record Gemini API call metrics
pub fn record_gemini_call(model: &str, status_code: u16, duration_secs: f64) {
    GEMINI_API_CALLS
        .with_label_values(&[model, &status_code.to_string()])
        .inc();

    GEMINI_API_DURATION
        .with_label_values(&[model])
        .observe(duration_secs);
}

pub fn record_tts_call(status: &str) {
    TTS_CALLS.with_label_values(&[status]).inc();
}

/// Helper to record a failed pipeline stage
pub fn record_pipeline_failure(stage: &str, error_type: &str) {
    PIPELINE_FAILURES.with_label_values(&[stage, error_type]).inc();
}

pub fn record_summary_fallback(model: &str) {
    SUMMARY_FALLBACKS.with_label_values(&[model]).inc();
}
