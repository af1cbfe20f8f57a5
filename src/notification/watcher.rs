use tokio::sync::watch;

use super::types::NotificationList;

/// Read side of a registry for rendering components.
///
/// Holds the latest published list. Bursts of changes between two reads
/// collapse into the newest list; a removed entry never reappears.
#[derive(Debug, Clone)]
pub struct NotificationWatcher {
    receiver: watch::Receiver<NotificationList>,
}

impl NotificationWatcher {
    pub(crate) fn new(receiver: watch::Receiver<NotificationList>) -> Self {
        Self { receiver }
    }

    /// The list as of the last completed registry mutation
    pub fn current(&self) -> NotificationList {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change and return the new list.
    ///
    /// Returns `None` once the registry has been dropped.
    pub async fn changed(&mut self) -> Option<NotificationList> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Whether a change has been published since the last `changed()`
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}
