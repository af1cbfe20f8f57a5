use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::notification::{Category, ToastPosition};

/// Prefix for environment overrides, e.g. `MEAL_ALERTS_SERVER__PORT=9000`.
const ENV_PREFIX: &str = "MEAL_ALERTS";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// SSE keep-alive interval in seconds
    #[serde(default = "default_sse_keep_alive")]
    pub sse_keep_alive: u64,
    /// Seconds to wait for SSE streams to close on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

/// Notification lifetimes and toast mirroring.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Default time-to-live for success notifications (ms)
    #[serde(default = "default_short_ttl_ms")]
    pub success_ms: u64,
    /// Default time-to-live for info notifications (ms)
    #[serde(default = "default_short_ttl_ms")]
    pub info_ms: u64,
    /// Default time-to-live for warning notifications (ms)
    #[serde(default = "default_short_ttl_ms")]
    pub warning_ms: u64,
    /// Default time-to-live for error notifications (ms)
    #[serde(default = "default_error_ttl_ms")]
    pub error_ms: u64,
    /// Mirror every accepted notification to the toast sink
    #[serde(default = "default_mirror_toasts")]
    pub mirror_toasts: bool,
    #[serde(default)]
    pub toast_position: ToastPosition,
    /// Buffered toasts per SSE subscriber before it starts lagging
    #[serde(default = "default_toast_channel_capacity")]
    pub toast_channel_capacity: usize,
}

/// Console log output.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// OpenTelemetry export settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_sse_keep_alive() -> u64 {
    15
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_short_ttl_ms() -> u64 {
    5000
}

fn default_error_ttl_ms() -> u64 {
    7000 // failures need more reading time
}

fn default_mirror_toasts() -> bool {
    true
}

fn default_toast_channel_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "meal-alerts".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("notifications.success_ms", default_short_ttl_ms())?
            .set_default("notifications.info_ms", default_short_ttl_ms())?
            .set_default("notifications.warning_ms", default_short_ttl_ms())?
            .set_default("notifications.error_ms", default_error_ttl_ms())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // MEAL_ALERTS_NOTIFICATIONS__ERROR_MS, MEAL_ALERTS_OTEL__ENABLED, ...
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl NotificationConfig {
    /// Default time-to-live for a category
    pub fn default_duration(&self, category: Category) -> Duration {
        let millis = match category {
            Category::Success => self.success_ms,
            Category::Info => self.info_ms,
            Category::Warning => self.warning_ms,
            Category::Error => self.error_ms,
        };
        Duration::from_millis(millis)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            sse_keep_alive: default_sse_keep_alive(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            success_ms: default_short_ttl_ms(),
            info_ms: default_short_ttl_ms(),
            warning_ms: default_short_ttl_ms(),
            error_ms: default_error_ttl_ms(),
            mirror_toasts: default_mirror_toasts(),
            toast_position: ToastPosition::default(),
            toast_channel_capacity: default_toast_channel_capacity(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
