//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    NOTIFICATIONS_ACTIVE, NOTIFICATIONS_ADDED_TOTAL, NOTIFICATIONS_REMOVED_TOTAL,
    SSE_CONNECTIONS_ACTIVE, TOASTS_EMITTED_TOTAL,
};
use crate::notification::{Category, RemovalReason};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording registry metrics
pub struct NotificationMetrics;

impl NotificationMetrics {
    /// Record a notification added to a registry
    pub fn record_added(category: Category) {
        NOTIFICATIONS_ADDED_TOTAL
            .with_label_values(&[category.as_str()])
            .inc();
        NOTIFICATIONS_ACTIVE.inc();
    }

    /// Record notifications leaving a registry
    pub fn record_removed(reason: RemovalReason, count: u64) {
        if count == 0 {
            return;
        }
        NOTIFICATIONS_REMOVED_TOTAL
            .with_label_values(&[reason.as_str()])
            .inc_by(count);
        NOTIFICATIONS_ACTIVE.sub(count as i64);
    }

    /// Record live entries discarded because their registry was dropped
    pub fn record_discarded(count: u64) {
        NOTIFICATIONS_ACTIVE.sub(count as i64);
    }
}

/// Helper struct for recording toast metrics
pub struct ToastMetrics;

impl ToastMetrics {
    pub fn record_emitted(sink: &str) {
        TOASTS_EMITTED_TOTAL.with_label_values(&[sink]).inc();
    }
}

/// Helper struct for recording SSE metrics
pub struct SseMetrics;

impl SseMetrics {
    pub fn connection_opened() {
        SSE_CONNECTIONS_ACTIVE.inc();
    }

    pub fn connection_closed() {
        SSE_CONNECTIONS_ACTIVE.dec();
    }
}
