use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use stackdrop::config::Config;
use stackdrop::notify::NotifierRegistry;
use stackdrop::storage::ReportStore;

/// How long pending notifications may run once the server has stopped.
const NOTIFY_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting stackdrop");

    tokio::fs::create_dir_all(&config.traces_dir).await?;
    tracing::info!("Writing reports to {}", config.traces_dir.display());

    let store = ReportStore::new(config.traces_dir.clone());
    let notifiers = NotifierRegistry::from_config(&config.notify);
    let app = stackdrop::build_app_with(&config, store, notifiers.clone());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = wait_for_signal().await;
            tracing::info!("Received {signal}, no longer accepting reports");
        })
        .await?;

    notifiers.drain(NOTIFY_GRACE).await;
    tracing::info!("Stopped");

    Ok(())
}

/// Resolves with the name of the first termination signal seen.
async fn wait_for_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            },
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable ({e}), waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "Ctrl+C"
    }
}
