//! Prometheus metrics for the notification registry.
//!
//! - Registry metrics (added, removed by reason, currently active)
//! - Toast mirror metrics
//! - SSE subscriber metrics

mod helpers;

pub use helpers::{encode_metrics, NotificationMetrics, SseMetrics, ToastMetrics};

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, register_int_gauge, IntCounterVec, IntGauge};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "meal_alerts";

lazy_static! {
    // ============================================================================
    // Registry Metrics
    // ============================================================================

    /// Notifications added, by category
    pub static ref NOTIFICATIONS_ADDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_notifications_added_total", METRIC_PREFIX),
        "Total notifications added to a registry",
        &["category"]
    ).unwrap();

    /// Notifications removed, by reason (expired, dismissed, cleared)
    pub static ref NOTIFICATIONS_REMOVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_notifications_removed_total", METRIC_PREFIX),
        "Total notifications removed from a registry",
        &["reason"]
    ).unwrap();

    /// Notifications currently visible across all registries
    pub static ref NOTIFICATIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_notifications_active", METRIC_PREFIX),
        "Number of notifications currently visible"
    ).unwrap();

    // ============================================================================
    // Toast Metrics
    // ============================================================================

    /// Toasts handed to a display sink
    pub static ref TOASTS_EMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_toasts_emitted_total", METRIC_PREFIX),
        "Total toasts handed to a display sink",
        &["sink"]
    ).unwrap();

    // ============================================================================
    // SSE Metrics
    // ============================================================================

    /// Open SSE streams
    pub static ref SSE_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_sse_connections_active", METRIC_PREFIX),
        "Number of open notification SSE streams"
    ).unwrap();
}
