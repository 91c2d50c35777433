//! chaos-webhook - Admission webhooks for PhysicalMachineChaos resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads configuration from the environment
//! - Starts the health server and, when certificates are mounted, the webhook server

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use chaos_webhook::{HealthState, WebhookConfig, run_health_server, run_webhook_server};

/// Grace period for in-flight admission requests to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chaos_webhook=info".parse()?),
        )
        .json()
        .init();

    info!("Starting chaos-webhook");

    let config = WebhookConfig::from_env()?;
    info!(
        webhook_port = config.webhook_port,
        health_port = config.health_port,
        cert_path = %config.cert_path.display(),
        "Loaded configuration"
    );

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately (liveness should work before TLS is up)
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    // Only start the webhook server if certificates are available
    let webhook_handle = if config.tls_files_present() {
        info!("TLS certificates found, starting webhook server");
        let health_state = health_state.clone();
        let config = config.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = run_webhook_server(&config, health_state).await {
                error!("Webhook server error: {}", e);
            }
        }))
    } else {
        warn!(
            cert_path = %config.cert_path.display(),
            key_path = %config.key_path.display(),
            "Webhook certificates not found, webhook server disabled and readiness stays false"
        );
        None
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        result = async {
            match webhook_handle {
                Some(handle) => handle.await,
                None => std::future::pending().await,
            }
        } => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the API server stops routing reviews here
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");

            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("chaos-webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut down
/// gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
