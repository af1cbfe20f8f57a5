//! SSE handler implementation.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::metrics::SseMetrics;
use crate::notification::{NotificationList, NotificationWatcher, Toast};
use crate::server::AppState;

/// One item of the SSE feed.
#[derive(Debug, Clone)]
pub enum SseMessage {
    Snapshot(NotificationList),
    Toast(Toast),
}

impl SseMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            SseMessage::Snapshot(_) => "snapshot",
            SseMessage::Toast(_) => "toast",
        }
    }

    fn to_event(&self) -> Event {
        let event = Event::default().event(self.event_name());
        let data = match self {
            SseMessage::Snapshot(list) => event.json_data(&**list),
            SseMessage::Toast(toast) => event.json_data(toast),
        };
        data.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize SSE message");
            Event::default()
                .event("error")
                .data(r#"{"code":"SERIALIZATION_ERROR"}"#)
        })
    }
}

/// SSE handler
#[tracing::instrument(name = "sse.connect", skip(state))]
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let guard = ConnectionGuard::new(state.sse_connections.clone());
    let messages = sse_messages(
        state.registry.subscribe(),
        state.toast_feed.subscribe(),
        state.shutdown_tx.subscribe(),
    );

    let stream = async_stream::stream! {
        // Hold the guard - it will be dropped when the stream ends
        let _guard = guard;
        for await message in messages {
            yield Ok(message.to_event());
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(state.settings.server.sse_keep_alive))
            .text("heartbeat"),
    )
}

enum Step {
    Message(SseMessage),
    Skip,
    ToastsClosed,
    Stop,
}

/// The message feed behind one SSE connection.
///
/// Starts with the current snapshot, then interleaves snapshots and toasts as
/// they happen. Ends when the registry is dropped or shutdown is signalled.
/// Snapshots published in quick succession may be coalesced into the latest.
pub fn sse_messages(
    mut watcher: NotificationWatcher,
    mut toasts: broadcast::Receiver<Toast>,
    mut shutdown: broadcast::Receiver<()>,
) -> impl Stream<Item = SseMessage> {
    async_stream::stream! {
        yield SseMessage::Snapshot(watcher.current());

        let mut toasts_open = true;
        loop {
            let step = tokio::select! {
                _ = shutdown.recv() => Step::Stop,
                changed = watcher.changed() => match changed {
                    Some(list) => Step::Message(SseMessage::Snapshot(list)),
                    None => Step::Stop,
                },
                toast = toasts.recv(), if toasts_open => match toast {
                    Ok(toast) => Step::Message(SseMessage::Toast(toast)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped = skipped, "SSE subscriber lagging, toasts dropped");
                        Step::Skip
                    }
                    Err(RecvError::Closed) => Step::ToastsClosed,
                },
            };

            match step {
                Step::Message(message) => yield message,
                Step::Skip => {}
                Step::ToastsClosed => toasts_open = false,
                Step::Stop => break,
            }
        }
    }
}

/// Tracks one open SSE stream.
struct ConnectionGuard {
    connections: Arc<AtomicUsize>,
    opened_at: Instant,
}

impl ConnectionGuard {
    fn new(connections: Arc<AtomicUsize>) -> Self {
        let open = connections.fetch_add(1, Ordering::Relaxed) + 1;
        SseMetrics::connection_opened();
        tracing::info!(open_streams = open, "SSE stream opened");
        Self {
            connections,
            opened_at: Instant::now(),
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.connections.fetch_sub(1, Ordering::Relaxed);
        SseMetrics::connection_closed();
        tracing::info!(
            duration_secs = self.opened_at.elapsed().as_secs_f64(),
            "SSE stream closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationConfig;
    use crate::notification::{BroadcastToastSink, NotificationRegistry};
    use futures::StreamExt;

    fn registry_with_feed() -> (NotificationRegistry, BroadcastToastSink) {
        let feed = BroadcastToastSink::new(8);
        let registry = NotificationRegistry::builder(NotificationConfig::default())
            .toast_sink(Arc::new(feed.clone()))
            .build();
        (registry, feed)
    }

    #[tokio::test]
    async fn test_stream_starts_with_current_snapshot() {
        let (registry, feed) = registry_with_feed();
        registry.info("Lunch reminder");
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let stream = sse_messages(registry.subscribe(), feed.subscribe(), shutdown_rx);
        futures::pin_mut!(stream);

        match stream.next().await {
            Some(SseMessage::Snapshot(list)) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].message(), "Lunch reminder");
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_emits_toast_and_snapshot_on_add() {
        let (registry, feed) = registry_with_feed();
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let stream = sse_messages(registry.subscribe(), feed.subscribe(), shutdown_rx);
        futures::pin_mut!(stream);
        assert!(matches!(stream.next().await, Some(SseMessage::Snapshot(list)) if list.is_empty()));

        registry.success("Dinner logged");

        let mut saw_toast = false;
        let mut saw_snapshot = false;
        for _ in 0..2 {
            match stream.next().await {
                Some(SseMessage::Toast(toast)) => {
                    assert_eq!(toast.message, "Dinner logged");
                    saw_toast = true;
                }
                Some(SseMessage::Snapshot(list)) => {
                    assert_eq!(list.len(), 1);
                    saw_snapshot = true;
                }
                None => panic!("stream ended early"),
            }
        }
        assert!(saw_toast && saw_snapshot);
    }

    #[tokio::test]
    async fn test_stream_ends_on_shutdown() {
        let (registry, feed) = registry_with_feed();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let stream = sse_messages(registry.subscribe(), feed.subscribe(), shutdown_rx);
        futures::pin_mut!(stream);
        assert!(stream.next().await.is_some());

        shutdown_tx.send(()).unwrap();
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_event_names() {
        let empty: NotificationList = Vec::new().into();
        assert_eq!(SseMessage::Snapshot(empty).event_name(), "snapshot");
    }

    #[test]
    fn test_connection_guard_counts() {
        let counter = Arc::new(AtomicUsize::new(0));
        let guard = ConnectionGuard::new(counter.clone());
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        drop(guard);
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }
}
