//! Graceful shutdown of the notification service.
//!
//! 1. Signals SSE streams and background tasks to stop
//! 2. Clears the registry, cancelling every pending expiry timer
//! 3. Waits for open SSE streams to close

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::notification::NotificationRegistry;
use crate::server::AppState;

/// Configuration for graceful shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Time to wait for SSE streams to close (default: 5 seconds)
    pub drain_timeout: Duration,
    /// Interval between checks while draining
    pub poll_interval: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Handles graceful shutdown of the notification service
pub struct GracefulShutdown {
    registry: NotificationRegistry,
    shutdown_tx: broadcast::Sender<()>,
    sse_connections: Arc<AtomicUsize>,
    config: ShutdownConfig,
}

impl GracefulShutdown {
    pub fn new(
        registry: NotificationRegistry,
        shutdown_tx: broadcast::Sender<()>,
        sse_connections: Arc<AtomicUsize>,
    ) -> Self {
        Self::with_config(registry, shutdown_tx, sse_connections, ShutdownConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(
        registry: NotificationRegistry,
        shutdown_tx: broadcast::Sender<()>,
        sse_connections: Arc<AtomicUsize>,
        config: ShutdownConfig,
    ) -> Self {
        Self {
            registry,
            shutdown_tx,
            sse_connections,
            config,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::with_config(
            state.registry.clone(),
            state.shutdown_tx.clone(),
            state.sse_connections.clone(),
            ShutdownConfig {
                drain_timeout: Duration::from_secs(state.settings.server.shutdown_timeout),
                ..ShutdownConfig::default()
            },
        )
    }

    /// Execute graceful shutdown sequence
    #[tracing::instrument(
        name = "graceful_shutdown",
        skip(self),
        fields(active_notifications = self.registry.len())
    )]
    pub async fn execute(&self, reason: &str) -> ShutdownResult {
        let start = std::time::Instant::now();
        let mut result = ShutdownResult::default();

        tracing::info!(
            reason = %reason,
            "Starting graceful shutdown - Phase 1: Signaling streams to stop"
        );
        let _ = self.shutdown_tx.send(());

        tracing::info!("Phase 2: Clearing notifications");
        result.notifications_cleared = self.registry.clear_all();

        tracing::info!("Phase 3: Waiting for SSE streams to close");
        let (closed, remaining) = self.wait_for_streams_to_close().await;
        result.streams_closed = closed;
        result.streams_remaining = remaining;

        result.duration = start.elapsed();
        result.success = remaining == 0;

        tracing::info!(
            notifications_cleared = result.notifications_cleared,
            streams_closed = result.streams_closed,
            streams_remaining = result.streams_remaining,
            duration_ms = result.duration.as_millis(),
            "Graceful shutdown completed"
        );

        result
    }

    /// Returns (closed, still open)
    async fn wait_for_streams_to_close(&self) -> (usize, usize) {
        let initial = self.sse_connections.load(Ordering::Relaxed);
        if initial == 0 {
            return (0, 0);
        }

        let wait_future = async {
            while self.sse_connections.load(Ordering::Relaxed) > 0 {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };
        let _ = timeout(self.config.drain_timeout, wait_future).await;

        let remaining = self.sse_connections.load(Ordering::Relaxed);
        if remaining > 0 {
            tracing::warn!(
                remaining_streams = remaining,
                "Some SSE streams did not close gracefully"
            );
        }

        (initial.saturating_sub(remaining), remaining)
    }
}

/// Result of a graceful shutdown operation
#[derive(Debug, Default)]
pub struct ShutdownResult {
    /// Whether every SSE stream closed in time
    pub success: bool,
    /// Notifications removed from the registry
    pub notifications_cleared: usize,
    pub streams_closed: usize,
    pub streams_remaining: usize,
    /// Total time taken for shutdown
    pub duration: Duration,
}
