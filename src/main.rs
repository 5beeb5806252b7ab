use anyhow::Result;
use tracing_subscriber::EnvFilter;

use deploy_notifier::config::{Config, LogFormat};
use deploy_notifier::startup;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (reads .env first)
    let config = Config::from_env()?;

    // Initialize tracing
    let default_filter = if config.debug {
        "deploy_notifier=debug,tower_http=debug"
    } else {
        "deploy_notifier=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    config.log_summary();

    startup::run(config).await
}
