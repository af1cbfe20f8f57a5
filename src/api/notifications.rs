//! Notification endpoints: list, raise, dismiss and clear.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::notification::{
    duration_millis, Category, Notification, NotificationId, NotificationOptions, Preset,
};
use crate::server::AppState;

/// Request to raise a notification
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    /// One of `success`, `error`, `warning`, `info`
    pub category: String,
    pub message: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    /// Overrides the category's default lifetime
    pub duration_ms: Option<u64>,
    /// Passed through unchanged
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Response for a raised notification
#[derive(Debug, Serialize)]
pub struct CreateNotificationResponse {
    pub id: NotificationId,
    /// Effective lifetime
    pub duration_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

/// GET /api/v1/notifications
pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.registry.snapshot().to_vec())
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>> {
    let id: NotificationId = id.parse()?;
    state
        .registry
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Notification {} is not active", id)))
}

/// POST /api/v1/notifications
#[tracing::instrument(
    name = "api.create_notification",
    skip(state, request),
    fields(category = %request.category)
)]
pub async fn create_notification(
    State(state): State<AppState>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<CreateNotificationResponse>)> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }
    let category: Category = request.category.parse()?;

    let mut options = NotificationOptions::new().with_metadata(request.metadata);
    if let Some(title) = request.title {
        options = options.title(title);
    }
    if let Some(icon) = request.icon {
        options = options.icon(icon);
    }
    let duration = match request.duration_ms {
        Some(millis) => Duration::from_millis(millis),
        None => state.registry.default_duration(category),
    };
    options = options.duration(duration);

    let id = state.registry.add(category, request.message, options);

    Ok((
        StatusCode::CREATED,
        Json(CreateNotificationResponse {
            id,
            duration_ms: duration_millis(duration),
        }),
    ))
}

/// POST /api/v1/notifications/presets
pub async fn raise_preset(
    State(state): State<AppState>,
    Json(preset): Json<Preset>,
) -> (StatusCode, Json<CreateNotificationResponse>) {
    let duration_ms = duration_millis(state.registry.default_duration(preset.category()));
    let id = preset.apply(&state.registry);

    (
        StatusCode::CREATED,
        Json(CreateNotificationResponse { id, duration_ms }),
    )
}

/// DELETE /api/v1/notifications/{id}
///
/// 204 whether or not the notification was still active.
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: NotificationId = id.parse()?;
    state.registry.remove(id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/notifications
pub async fn clear_notifications(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.registry.clear_all();
    tracing::info!(cleared = cleared, "Notifications cleared via API");
    Json(ClearResponse { cleared })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::notification::{BroadcastToastSink, NotificationRegistry, Toast, ToastSink};
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState::new(Settings::default())
    }

    fn create_request(category: &str, message: &str) -> CreateNotificationRequest {
        CreateNotificationRequest {
            category: category.to_string(),
            message: message.to_string(),
            title: None,
            icon: None,
            duration_ms: None,
            metadata: serde_json::Map::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_uses_category_default() {
        let state = test_state();
        let request = create_request("error", "Upload failed");
        let (status, Json(body)) = create_notification(State(state.clone()), Json(request))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.duration_ms, 7000);
        assert!(state.registry.contains(body.id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_rejects_unknown_category() {
        let state = test_state();
        let err = create_notification(State(state.clone()), Json(create_request("fatal", "boom")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Notification(_)));
        assert!(state.registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_rejects_blank_message() {
        let state = test_state();
        let err = create_notification(State(state.clone()), Json(create_request("info", "   ")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_is_idempotent() {
        let state = test_state();
        let id = state.registry.info("Water reminder");

        let first = dismiss_notification(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap();
        let second = dismiss_notification(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap();

        assert_eq!(first, StatusCode::NO_CONTENT);
        assert_eq!(second, StatusCode::NO_CONTENT);
        assert!(state.registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_missing_is_not_found() {
        let state = test_state();
        let err = get_notification(State(state), Path("ntf-999999".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    /// Clears the registry as soon as a toast is mirrored, before the
    /// raising call returns.
    #[derive(Default)]
    struct ClearingSink {
        registry: std::sync::OnceLock<NotificationRegistry>,
    }

    impl ToastSink for ClearingSink {
        fn show(&self, _toast: &Toast) {
            if let Some(registry) = self.registry.get() {
                registry.clear_all();
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_reports_lifetime_when_entry_is_already_gone() {
        let mut settings = Settings::default();
        settings.notifications.error_ms = 9000;
        let sink = Arc::new(ClearingSink::default());
        let registry = NotificationRegistry::builder(settings.notifications.clone())
            .toast_sink(sink.clone())
            .build();
        sink.registry.set(registry.clone()).ok();
        let state = AppState::with_registry(settings, registry, BroadcastToastSink::new(1));

        let (status, Json(body)) = raise_preset(
            State(state.clone()),
            Json(Preset::SyncFailed {
                detail: "timeout".to_string(),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(!state.registry.contains(body.id));
        assert_eq!(body.duration_ms, 9000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_reports_count() {
        let state = test_state();
        state.registry.success("a");
        state.registry.warning("b");

        let Json(body) = clear_notifications(State(state.clone())).await;
        assert_eq!(body.cleared, 2);
        assert!(state.registry.is_empty());
    }
}
