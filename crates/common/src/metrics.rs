use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static PRIMARY_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketplace_primary_failures_total",
        "Primary API calls that were abandoned in favour of the document store",
        &["resource", "cause"]
    )
    .expect("register primary_failures_total")
});

pub static FALLBACK_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketplace_fallback_total",
        "Direct document store operations performed by the data client",
        &["resource", "action", "outcome"]
    )
    .expect("register fallback_total")
});

pub static STORE_WRITES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketplace_store_writes_total",
        "Document store writes by collection",
        &["collection", "action"]
    )
    .expect("register store_writes_total")
});

pub static IMAGE_UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketplace_image_uploads_total",
        "Image uploads to the CDN by outcome",
        &["outcome"]
    )
    .expect("register image_uploads_total")
});

/// Encode the default registry in the Prometheus text format.
pub fn encode_metrics() -> (u16, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (500, format!("metrics encode error: {e}"));
    }
    (200, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_metrics_include_touched_counters() {
        PRIMARY_FAILURES_TOTAL.with_label_values(&["providers", "html_body"]).inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, 200);
        assert!(body.contains("marketplace_primary_failures_total"));
    }
}
