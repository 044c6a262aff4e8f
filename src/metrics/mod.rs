//! Prometheus metrics for push delivery.
//!
//! - Delivery metrics (sent, failed, latency by engine)
//! - Token metrics (client-credentials refreshes by outcome)
//! - Device lookup metrics (hits and misses on the relay path)

mod helpers;

pub use helpers::{encode_metrics, DeviceLookupMetrics, PushMetrics, TokenMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "vault_push";

lazy_static! {
    // ============================================================================
    // Delivery Metrics
    // ============================================================================

    /// Pushes delivered, by engine and push type
    pub static ref PUSH_SENT_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_sent_total", METRIC_PREFIX),
        "Total pushes handed to a transport successfully",
        &["engine", "push_type"]
    ).unwrap();

    /// Pushes whose delivery raised an error
    pub static ref PUSH_FAILED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_failed_total", METRIC_PREFIX),
        "Total pushes that failed in the transport",
        &["engine"]
    ).unwrap();

    /// Time spent in the transport, token fetch included
    pub static ref PUSH_DURATION: HistogramVec = register_histogram_vec!(
        format!("{}_duration_seconds", METRIC_PREFIX),
        "Push delivery duration in seconds",
        &["engine"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ).unwrap();

    // ============================================================================
    // Token Metrics
    // ============================================================================

    /// Token endpoint calls by client and outcome
    pub static ref TOKEN_REFRESH_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_token_refresh_total", METRIC_PREFIX),
        "Total client-credentials token requests",
        &["client", "outcome"]
    ).unwrap();

    // ============================================================================
    // Device Lookup Metrics
    // ============================================================================

    /// Device identifier resolutions by outcome (hit, miss, none)
    pub static ref DEVICE_LOOKUP_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_device_lookup_total", METRIC_PREFIX),
        "Total device identifier lookups",
        &["outcome"]
    ).unwrap();
}
