//! Process-wide shared registry.
//!
//! The shared instance is created explicitly, once, at startup (`init` or
//! `install`) and is never constructed on first access. Components that want
//! an isolated registry build their own with [`NotificationRegistry::new`].

use std::sync::OnceLock;

use crate::config::NotificationConfig;

use super::error::NotificationError;
use super::registry::NotificationRegistry;

static GLOBAL: RegistrySlot = RegistrySlot::new();

/// A write-once holder for a shared registry.
#[derive(Debug, Default)]
pub struct RegistrySlot {
    cell: OnceLock<NotificationRegistry>,
}

impl RegistrySlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Store `registry`. Fails if the slot is already filled.
    pub fn install(
        &self,
        registry: NotificationRegistry,
    ) -> Result<NotificationRegistry, NotificationError> {
        let handle = registry.clone();
        self.cell
            .set(registry)
            .map_err(|_| NotificationError::AlreadyInitialized)?;
        Ok(handle)
    }

    /// Handle to the stored registry
    pub fn get(&self) -> Result<NotificationRegistry, NotificationError> {
        self.cell.get().cloned().ok_or(NotificationError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Create the process-wide registry on the current Tokio runtime.
pub fn init(config: &NotificationConfig) -> Result<NotificationRegistry, NotificationError> {
    if GLOBAL.is_initialized() {
        return Err(NotificationError::AlreadyInitialized);
    }
    install(NotificationRegistry::new(config.clone()))
}

/// Make a pre-built registry the process-wide one.
pub fn install(registry: NotificationRegistry) -> Result<NotificationRegistry, NotificationError> {
    let handle = GLOBAL.install(registry)?;
    tracing::info!("Shared notification registry initialized");
    Ok(handle)
}

/// Handle to the process-wide registry.
pub fn global() -> Result<NotificationRegistry, NotificationError> {
    GLOBAL.get()
}

pub fn try_global() -> Option<NotificationRegistry> {
    GLOBAL.get().ok()
}

/// Run `f` against the process-wide registry.
pub fn with_global<R>(f: impl FnOnce(&NotificationRegistry) -> R) -> Result<R, NotificationError> {
    let registry = GLOBAL.get()?;
    Ok(f(&registry))
}
