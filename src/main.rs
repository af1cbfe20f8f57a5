use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use meal_alerts::config::Settings;
use meal_alerts::notification::provider;
use meal_alerts::server::{create_app, AppState};
use meal_alerts::shutdown::GracefulShutdown;
use meal_alerts::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing (guard flushes spans on exit)
    let _telemetry = init_telemetry(&settings.log, &settings.otel)?;
    tracing::info!("Configuration loaded");

    // Create application state and share its registry process-wide
    let state = AppState::new(settings.clone());
    provider::install(state.registry.clone())?;
    tracing::info!("Application state initialized");

    let shutdown = GracefulShutdown::from_state(&state);

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // SSE streams never finish on their own, so they are told to stop
    // before axum waits for in-flight connections.
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = shutdown_signal_handler().await;
            let result = shutdown.execute(reason).await;
            if !result.success {
                tracing::warn!(
                    remaining_streams = result.streams_remaining,
                    "Shutdown finished with open streams"
                );
            }
        })
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            "ctrl-c"
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
            "sigterm"
        }
    }
}
