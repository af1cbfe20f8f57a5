//! Mirror surface for floating pop-ups.
//!
//! A [`ToastSink`] receives a copy of every notification the registry accepts
//! (when mirroring is enabled) and renders it on its own schedule. Sinks never
//! feed back into registry state: a toast that is still on screen after its
//! registry entry expired, or one that disappears early, is not an error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{duration_millis, serialize_millis, Category, Notification};
use crate::metrics::ToastMetrics;

/// Screen corner where toasts are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    TopCenter,
    BottomRight,
    BottomLeft,
    BottomCenter,
}

/// Presentation hints handed to the toast surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastStyle {
    pub position: ToastPosition,
    pub background: &'static str,
    pub icon: String,
}

impl ToastStyle {
    /// Default style for a category; a notification icon overrides the
    /// category icon.
    pub fn for_category(category: Category, position: ToastPosition, icon: Option<&str>) -> Self {
        let (background, default_icon) = match category {
            Category::Success => ("#10b981", "✅"),
            Category::Error => ("#ef4444", "❌"),
            Category::Warning => ("#f59e0b", "⚠️"),
            Category::Info => ("#3b82f6", "ℹ️"),
        };

        Self {
            position,
            background,
            icon: icon.unwrap_or(default_icon).to_string(),
        }
    }
}

/// A pop-up request derived from a notification.
#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub style: ToastStyle,
}

impl Toast {
    pub fn from_notification(notification: &Notification, position: ToastPosition) -> Self {
        Self {
            category: notification.category(),
            title: notification.title().map(str::to_string),
            message: notification.message().to_string(),
            duration: notification.duration(),
            style: ToastStyle::for_category(notification.category(), position, notification.icon()),
        }
    }
}

/// Display sink for toasts.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: &Toast);
}

/// Writes toasts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingToastSink;

impl ToastSink for TracingToastSink {
    fn show(&self, toast: &Toast) {
        tracing::info!(
            category = %toast.category,
            title = toast.title.as_deref().unwrap_or(""),
            duration_ms = duration_millis(toast.duration),
            position = ?toast.style.position,
            "{}",
            toast.message
        );
        ToastMetrics::record_emitted("tracing");
    }
}

/// Fans toasts out to any number of live subscribers (SSE streams).
///
/// Toasts emitted while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastToastSink {
    sender: broadcast::Sender<Toast>,
}

impl BroadcastToastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ToastSink for BroadcastToastSink {
    fn show(&self, toast: &Toast) {
        if self.sender.send(toast.clone()).is_ok() {
            ToastMetrics::record_emitted("broadcast");
        } else {
            tracing::trace!(category = %toast.category, "No toast subscribers, toast dropped");
        }
    }
}

/// Forwards each toast to several sinks in order.
#[derive(Clone, Default)]
pub struct FanoutToastSink {
    sinks: Vec<Arc<dyn ToastSink>>,
}

impl FanoutToastSink {
    pub fn new(sinks: Vec<Arc<dyn ToastSink>>) -> Self {
        Self { sinks }
    }
}

impl ToastSink for FanoutToastSink {
    fn show(&self, toast: &Toast) {
        for sink in &self.sinks {
            sink.show(toast);
        }
    }
}
