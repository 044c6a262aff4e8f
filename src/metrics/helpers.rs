//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use crate::push::PushType;

use super::{
    DEVICE_LOOKUP_TOTAL, PUSH_DURATION, PUSH_FAILED_TOTAL, PUSH_SENT_TOTAL, TOKEN_REFRESH_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording delivery metrics
pub struct PushMetrics;

impl PushMetrics {
    /// Record a successful delivery
    pub fn record_sent(engine: &str, push_type: PushType, elapsed: Duration) {
        PUSH_SENT_TOTAL
            .with_label_values(&[engine, push_type.as_str()])
            .inc();
        PUSH_DURATION
            .with_label_values(&[engine])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a failed delivery
    pub fn record_failed(engine: &str, elapsed: Duration) {
        PUSH_FAILED_TOTAL.with_label_values(&[engine]).inc();
        PUSH_DURATION
            .with_label_values(&[engine])
            .observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for recording token metrics
pub struct TokenMetrics;

impl TokenMetrics {
    pub fn record_refreshed(client: &str) {
        TOKEN_REFRESH_TOTAL
            .with_label_values(&[client, "success"])
            .inc();
    }

    pub fn record_failed(client: &str) {
        TOKEN_REFRESH_TOTAL
            .with_label_values(&[client, "failure"])
            .inc();
    }
}

/// Helper struct for recording device lookup metrics
pub struct DeviceLookupMetrics;

impl DeviceLookupMetrics {
    pub fn record_hit() {
        DEVICE_LOOKUP_TOTAL.with_label_values(&["hit"]).inc();
    }

    pub fn record_miss() {
        DEVICE_LOOKUP_TOTAL.with_label_values(&["miss"]).inc();
    }

    /// No ambient identifier, so no lookup was attempted
    pub fn record_skipped() {
        DEVICE_LOOKUP_TOTAL.with_label_values(&["none"]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_series() {
        PushMetrics::record_sent("test", PushType::SyncVault, Duration::from_millis(3));
        TokenMetrics::record_refreshed("test");
        DeviceLookupMetrics::record_miss();

        let output = encode_metrics().unwrap();
        assert!(output.contains("vault_push_sent_total"));
        assert!(output.contains("vault_push_token_refresh_total"));
        assert!(output.contains("vault_push_device_lookup_total"));
    }
}
