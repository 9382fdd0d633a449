use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensor_card::common::AppState;
use sensor_card::config::Config;
use sensor_card::routes;
use sensor_card::sensors::SensorsClient;
use sensor_card::sync;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sensor_card=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sensor-card...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        deployment = ?config.deployment,
        sensors_api = %config.sensors_api_base_url,
        sensor_id = config.sensor_id,
        chart_window = ?config.chart_window,
        host = %config.api_host,
        port = config.api_port,
        "Configuration loaded"
    );

    // Create sensors API client
    let sensors_client = SensorsClient::new(&config)?;
    tracing::info!("Sensors API client initialized");

    // Create application state (card, history, update cycle)
    let state = AppState::new(config.clone(), Arc::new(sensors_client));

    // Spawn the periodic card refresh (fire-and-forget, non-blocking)
    tracing::info!("Spawning card refresh task...");
    tokio::spawn(sync::scheduler::run_card_refresh(
        state.poller.clone(),
        config.poll_interval_seconds,
    ));

    // Build router
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
