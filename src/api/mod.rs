//! HTTP endpoints over the shared notification registry.

mod health;
mod metrics;
mod notifications;
mod routes;

pub use health::{health, stats, HealthResponse, StatsResponse};
pub use metrics::prometheus_metrics;
pub use notifications::{
    clear_notifications, create_notification, dismiss_notification, get_notification,
    list_notifications, raise_preset, ClearResponse, CreateNotificationRequest,
    CreateNotificationResponse,
};
pub use routes::api_routes;
