use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;
use crate::sse::sse_handler;

use super::health::{health, stats};
use super::metrics::prometheus_metrics;
use super::notifications::{
    clear_notifications, create_notification, dismiss_notification, get_notification,
    list_notifications, raise_preset,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health, stats & metrics
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Notification endpoints
        .nest(
            "/api/v1",
            Router::new()
                .route(
                    "/notifications",
                    get(list_notifications)
                        .post(create_notification)
                        .delete(clear_notifications),
                )
                .route("/notifications/presets", post(raise_preset))
                .route("/notifications/stream", get(sse_handler))
                .route(
                    "/notifications/{id}",
                    get(get_notification).delete(dismiss_notification),
                ),
        )
}
