//! Application startup and initialization logic

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use crate::app_state::AppState;
use crate::auth::SignatureVerifier;
use crate::config::Config;
use crate::router::build_router;
use crate::services::Notifier;

/// Build the shared state from a loaded configuration.
pub fn initialize_app(config: Config) -> Result<AppState> {
    let verifier = SignatureVerifier::new(config.hmac_key.clone(), config.hmac_algorithm)
        .with_diagnostics(config.debug);
    info!("✅ Signature verifier initialized ({})", verifier.algorithm());

    let notifier = Notifier::from_config(&config)?;
    info!("✅ Notifier initialized");

    Ok(AppState {
        config: Arc::new(config),
        verifier,
        notifier,
    })
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn run(config: Config) -> Result<()> {
    let bind = config.bind.clone();
    let app_state = initialize_app(config)?;
    let app = build_router(app_state);

    let listener = TcpListener::bind(bind.as_str()).await?;
    info!("Starting server at {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGTERM or SIGINT signal for graceful shutdown
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
