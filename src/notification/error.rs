use thiserror::Error;

/// Errors raised by the notification registry and its provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The category tag is not one of `success`, `error`, `warning` or `info`.
    #[error("Invalid notification category: {0:?}")]
    InvalidCategory(String),

    /// A textual notification id could not be parsed.
    #[error("Invalid notification id: {0:?}")]
    InvalidId(String),

    /// The process-wide registry was already initialized.
    #[error("Notification registry is already initialized")]
    AlreadyInitialized,

    /// The process-wide registry has not been initialized yet.
    #[error("Notification registry has not been initialized")]
    NotInitialized,
}
