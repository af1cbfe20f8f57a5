//! In-memory registry of the currently visible notifications.
//!
//! Every entry owns exactly one expiry timer, a Tokio task sleeping until the
//! entry's deadline. Removing an entry early aborts that task. All mutations
//! (add, remove, clear, timer fire) run inside one critical section and
//! publish a fresh snapshot before the lock is released, so observers only
//! ever see whole states.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::config::NotificationConfig;
use crate::metrics::NotificationMetrics;

use super::error::NotificationError;
use super::toast::{Toast, ToastSink};
use super::types::{
    duration_millis, Category, Notification, NotificationId, NotificationList, NotificationOptions,
    RemovalReason,
};
use super::watcher::NotificationWatcher;

/// Deadline used when `now + duration` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Lifetime counters (atomic for lock-free reads).
#[derive(Debug, Default)]
struct RegistryCounters {
    total_added: AtomicU64,
    total_expired: AtomicU64,
    total_dismissed: AtomicU64,
    total_cleared: AtomicU64,
}

impl RegistryCounters {
    fn record_removed(&self, reason: RemovalReason, count: u64) {
        let counter = match reason {
            RemovalReason::Expired => &self.total_expired,
            RemovalReason::Dismissed => &self.total_dismissed,
            RemovalReason::Cleared => &self.total_cleared,
        };
        counter.fetch_add(count, Ordering::Relaxed);
        NotificationMetrics::record_removed(reason, count);
    }
}

/// Registry statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub active: usize,
    pub total_added: u64,
    pub total_expired: u64,
    pub total_dismissed: u64,
    pub total_cleared: u64,
}

struct Entry {
    notification: Notification,
    timer: AbortHandle,
}

struct Inner {
    config: NotificationConfig,
    runtime: Handle,
    /// Ids are allocated while this lock is held, so key order is
    /// insertion order.
    entries: Mutex<BTreeMap<NotificationId, Entry>>,
    snapshot_tx: watch::Sender<NotificationList>,
    toast_sink: Option<Arc<dyn ToastSink>>,
    counters: RegistryCounters,
}

impl Inner {
    /// Must be called with `entries` locked.
    fn publish(&self, entries: &BTreeMap<NotificationId, Entry>) {
        let list: NotificationList = entries
            .values()
            .map(|entry| entry.notification.clone())
            .collect();
        self.snapshot_tx.send_replace(list);
    }

    /// Timer callback. The firing task is the entry's own timer, so there is
    /// nothing left to abort.
    fn expire(&self, id: NotificationId) {
        let mut entries = self.entries.lock();
        if entries.remove(&id).is_none() {
            return;
        }
        self.publish(&entries);
        self.counters.record_removed(RemovalReason::Expired, 1);
        drop(entries);

        tracing::debug!(notification_id = %id, reason = "expired", "Notification removed");
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let entries = self.entries.get_mut();
        for entry in entries.values() {
            entry.timer.abort();
        }
        NotificationMetrics::record_discarded(entries.len() as u64);
    }
}

/// Owner of the visible notifications and their expiry schedule.
///
/// Cloning is cheap and yields another handle to the same registry. Timers
/// only hold weak references: once the last handle is dropped every pending
/// timer is aborted.
#[derive(Clone)]
pub struct NotificationRegistry {
    inner: Arc<Inner>,
}

/// Builder for [`NotificationRegistry`].
pub struct RegistryBuilder {
    config: NotificationConfig,
    runtime: Option<Handle>,
    toast_sink: Option<Arc<dyn ToastSink>>,
}

impl RegistryBuilder {
    /// Spawn expiry timers on this runtime instead of the current one
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Mirror accepted notifications to a toast sink
    pub fn toast_sink(mut self, sink: Arc<dyn ToastSink>) -> Self {
        self.toast_sink = Some(sink);
        self
    }

    /// Build the registry.
    ///
    /// # Panics
    ///
    /// Panics when no runtime handle was given and this is called outside a
    /// Tokio runtime, like `tokio::spawn`.
    pub fn build(self) -> NotificationRegistry {
        let runtime = self.runtime.unwrap_or_else(Handle::current);
        let (snapshot_tx, _) = watch::channel(NotificationList::from(Vec::new()));

        NotificationRegistry {
            inner: Arc::new(Inner {
                config: self.config,
                runtime,
                entries: Mutex::new(BTreeMap::new()),
                snapshot_tx,
                toast_sink: self.toast_sink,
                counters: RegistryCounters::default(),
            }),
        }
    }
}

impl NotificationRegistry {
    /// Create an independent registry on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics outside a Tokio runtime; see [`RegistryBuilder::build`].
    pub fn new(config: NotificationConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: NotificationConfig) -> RegistryBuilder {
        RegistryBuilder {
            config,
            runtime: None,
            toast_sink: None,
        }
    }

    /// Add a notification and schedule its expiry.
    ///
    /// The time-to-live is `options.duration` when set, otherwise the
    /// category default. The returned id is already visible to observers.
    pub fn add(
        &self,
        category: Category,
        message: impl Into<String>,
        options: NotificationOptions,
    ) -> NotificationId {
        let duration = options
            .duration
            .unwrap_or_else(|| self.default_duration(category));
        let message = message.into();

        let (id, toast) = {
            let mut entries = self.inner.entries.lock();
            // Allocated under the lock so key order matches insertion order
            let id = NotificationId::next();
            let notification = Notification::new(id, category, message, duration, options);
            let toast = self.mirror_toast(&notification);
            let timer = self.schedule_expiry(id, duration);
            entries.insert(id, Entry { notification, timer });
            self.inner.publish(&entries);
            self.inner.counters.total_added.fetch_add(1, Ordering::Relaxed);
            NotificationMetrics::record_added(category);
            (id, toast)
        };

        tracing::debug!(
            notification_id = %id,
            category = %category,
            duration_ms = duration_millis(duration),
            "Notification added"
        );

        if let (Some(sink), Some(toast)) = (&self.inner.toast_sink, toast) {
            sink.show(&toast);
        }

        id
    }

    /// Add a notification whose category arrives as a free-form tag.
    ///
    /// Fails with [`NotificationError::InvalidCategory`] for anything but
    /// `success`, `error`, `warning` or `info`, leaving the registry untouched.
    pub fn add_tagged(
        &self,
        tag: &str,
        message: impl Into<String>,
        options: NotificationOptions,
    ) -> Result<NotificationId, NotificationError> {
        let category = tag.parse::<Category>().map_err(|e| {
            tracing::warn!(tag = %tag, "Rejected notification with unknown category");
            e
        })?;
        Ok(self.add(category, message, options))
    }

    /// Dismiss a notification.
    ///
    /// Unknown or already removed ids are a no-op. Returns whether an entry
    /// was removed.
    pub fn remove(&self, id: NotificationId) -> bool {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.remove(&id) else {
            return false;
        };
        entry.timer.abort();
        self.inner.publish(&entries);
        self.inner.counters.record_removed(RemovalReason::Dismissed, 1);
        drop(entries);

        tracing::debug!(notification_id = %id, reason = "dismissed", "Notification removed");
        true
    }

    /// Remove every notification and cancel every pending timer.
    ///
    /// Observers see the registry go straight to empty. Returns the number of
    /// entries removed.
    pub fn clear_all(&self) -> usize {
        let mut entries = self.inner.entries.lock();
        let cleared = std::mem::take(&mut *entries);
        if cleared.is_empty() {
            return 0;
        }
        for entry in cleared.values() {
            entry.timer.abort();
        }
        self.inner.publish(&entries);
        self.inner
            .counters
            .record_removed(RemovalReason::Cleared, cleared.len() as u64);
        drop(entries);

        tracing::debug!(cleared = cleared.len(), "Notifications cleared");
        cleared.len()
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.add(Category::Success, message, NotificationOptions::default())
    }

    pub fn success_with(
        &self,
        message: impl Into<String>,
        options: NotificationOptions,
    ) -> NotificationId {
        self.add(Category::Success, message, options)
    }

    /// Errors default to the longer error time-to-live.
    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.add(Category::Error, message, NotificationOptions::default())
    }

    pub fn error_with(
        &self,
        message: impl Into<String>,
        options: NotificationOptions,
    ) -> NotificationId {
        self.add(Category::Error, message, options)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.add(Category::Warning, message, NotificationOptions::default())
    }

    pub fn warning_with(
        &self,
        message: impl Into<String>,
        options: NotificationOptions,
    ) -> NotificationId {
        self.add(Category::Warning, message, options)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.add(Category::Info, message, NotificationOptions::default())
    }

    pub fn info_with(
        &self,
        message: impl Into<String>,
        options: NotificationOptions,
    ) -> NotificationId {
        self.add(Category::Info, message, options)
    }

    /// Live notifications in insertion order
    pub fn snapshot(&self) -> NotificationList {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Observe the live list; see [`NotificationWatcher`].
    pub fn subscribe(&self) -> NotificationWatcher {
        NotificationWatcher::new(self.inner.snapshot_tx.subscribe())
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.inner
            .entries
            .lock()
            .get(&id)
            .map(|entry| entry.notification.clone())
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.inner.entries.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time-to-live applied when a caller does not override it
    pub fn default_duration(&self, category: Category) -> Duration {
        self.inner.config.default_duration(category)
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> RegistryStats {
        let counters = &self.inner.counters;
        RegistryStats {
            active: self.len(),
            total_added: counters.total_added.load(Ordering::Relaxed),
            total_expired: counters.total_expired.load(Ordering::Relaxed),
            total_dismissed: counters.total_dismissed.load(Ordering::Relaxed),
            total_cleared: counters.total_cleared.load(Ordering::Relaxed),
        }
    }

    fn mirror_toast(&self, notification: &Notification) -> Option<Toast> {
        match &self.inner.toast_sink {
            Some(_) if self.inner.config.mirror_toasts => Some(Toast::from_notification(
                notification,
                self.inner.config.toast_position,
            )),
            _ => None,
        }
    }

    /// Spawn the expiry timer for `id`. Called with `entries` locked, so the
    /// timer cannot observe the registry before the entry exists.
    fn schedule_expiry(&self, id: NotificationId, duration: Duration) -> AbortHandle {
        let registry: Weak<Inner> = Arc::downgrade(&self.inner);
        let now = Instant::now();
        let deadline = now.checked_add(duration).unwrap_or(now + FAR_FUTURE);

        self.inner
            .runtime
            .spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if let Some(inner) = registry.upgrade() {
                    inner.expire(id);
                }
            })
            .abort_handle()
    }
}

impl fmt::Debug for NotificationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRegistry")
            .field("active", &self.len())
            .field("config", &self.inner.config)
            .field("mirrors_toasts", &self.inner.toast_sink.is_some())
            .finish()
    }
}
