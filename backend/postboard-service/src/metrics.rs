use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Post view cache events (hit/miss/error).
    pub static ref POST_VIEW_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "post_view_cache_events_total",
        "Post view cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register post_view_cache_events_total");

    /// Duration of post view assembly by cache outcome.
    pub static ref POST_VIEW_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "post_view_duration_seconds",
        "Post view assembly duration segmented by cache outcome",
        &["source"]
    )
    .expect("failed to register post_view_duration_seconds");

    /// Like toggles by resulting state (liked/unliked).
    pub static ref LIKE_TOGGLE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "like_toggle_total",
        "Like toggles segmented by resulting state",
        &["result"]
    )
    .expect("failed to register like_toggle_total");
}

/// Render the default registry in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
