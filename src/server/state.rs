use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Settings;
use crate::notification::{
    BroadcastToastSink, FanoutToastSink, NotificationRegistry, ToastSink, TracingToastSink,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: NotificationRegistry,
    /// Toast feed consumed by SSE streams
    pub toast_feed: BroadcastToastSink,
    pub shutdown_tx: broadcast::Sender<()>,
    pub sse_connections: Arc<AtomicUsize>,
    pub start_time: Instant,
}

impl AppState {
    /// Build the state and its registry on the current Tokio runtime.
    ///
    /// Accepted notifications are mirrored both to the log and to the SSE toast feed.
    pub fn new(settings: Settings) -> Self {
        let toast_feed = BroadcastToastSink::new(settings.notifications.toast_channel_capacity);
        let sinks: Vec<Arc<dyn ToastSink>> = vec![
            Arc::new(TracingToastSink),
            Arc::new(toast_feed.clone()),
        ];
        let registry = NotificationRegistry::builder(settings.notifications.clone())
            .toast_sink(Arc::new(FanoutToastSink::new(sinks)))
            .build();

        Self::with_registry(settings, registry, toast_feed)
    }

    /// Build the state around an existing registry.
    pub fn with_registry(
        settings: Settings,
        registry: NotificationRegistry,
        toast_feed: BroadcastToastSink,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            settings: Arc::new(settings),
            registry,
            toast_feed,
            shutdown_tx,
            sse_connections: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Currently open SSE streams
    pub fn sse_connection_count(&self) -> usize {
        self.sse_connections.load(Ordering::Relaxed)
    }
}
