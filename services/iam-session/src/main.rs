//! IAM Session Service

use anyhow::Context;
use gatherup_config::AppConfig;
use iam_session::bootstrap::{self, SessionService};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config").context("Failed to load configuration")?;

    gatherup_telemetry::init(&config.telemetry.log_level, config.is_production());
    if let Some(port) = config.telemetry.metrics_port {
        gatherup_telemetry::init_metrics(port)?;
        info!(port, "Prometheus exporter listening");
    }

    info!(app_name = %config.app_name, app_env = %config.app_env, "Starting IAM Session Service");

    let pool = bootstrap::connect_database(&config.database).await?;
    bootstrap::run_migrations(&pool).await?;

    let service = SessionService::postgres(&config.auth, pool)?;
    info!(
        access_ttl_secs = service.coordinator.settings().access_token_ttl.as_secs(),
        refresh_ttl_secs = service.coordinator.settings().refresh_token_ttl.as_secs(),
        "Session coordinator ready"
    );

    let shutdown = CancellationToken::new();
    let cleanup = service.cleanup_task(&config.cleanup).start(shutdown.clone());

    shutdown_signal().await;
    info!("Shutdown signal received");

    shutdown.cancel();
    if let Err(e) = cleanup.await {
        error!(error = %e, "Cleanup task terminated abnormally");
    }

    info!("IAM Session Service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
