//! Ephemeral user-facing notifications.
//!
//! # Registry
//!
//! [`NotificationRegistry`] keeps the notifications that are currently on
//! screen. Each entry expires on its own timer (5 s for success, info and
//! warning, 7 s for errors, unless overridden) or earlier when dismissed.
//! Rendering components read [`NotificationRegistry::snapshot`] or follow a
//! [`NotificationWatcher`].
//!
//! The registry is available two ways:
//!
//! - `provider::init()` / `provider::global()`: one shared instance per
//!   process, created explicitly at startup
//! - `NotificationRegistry::new()`: an isolated instance
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = NotificationRegistry::new(settings.notifications.clone());
//! let id = registry.error("Failed to save meal");
//! registry.remove(id);
//! ```

mod error;
mod presets;
pub mod provider;
mod registry;
mod toast;
mod types;
mod watcher;

pub use error::NotificationError;
pub use presets::Preset;
pub use registry::{NotificationRegistry, RegistryBuilder, RegistryStats};
pub use toast::{
    BroadcastToastSink, FanoutToastSink, Toast, ToastPosition, ToastSink, ToastStyle,
    TracingToastSink,
};
pub(crate) use types::duration_millis;
pub use types::{
    Category, Notification, NotificationId, NotificationList, NotificationOptions, RemovalReason,
};
pub use watcher::NotificationWatcher;
