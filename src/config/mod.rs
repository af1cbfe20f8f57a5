mod settings;

pub use settings::{LogConfig, LogFormat, NotificationConfig, OtelConfig, ServerConfig, Settings};
