//! Skyisle Engine - Main entry point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyisle_engine::infrastructure::{
    clock::SystemClock,
    config::{IslandConfig, StoreBackend},
    island_store::{InMemoryIslandStore, SqliteIslandStore},
    ports::{ClockPort, IslandStorePort},
    world_codec::BinaryWorldCodec,
};
use skyisle_engine::use_cases::island::run_vacancy_sweeper;
use skyisle_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyisle_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Skyisle Engine");

    let config = IslandConfig::from_env().context("invalid island configuration")?;
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let store: Arc<dyn IslandStorePort> = match config.store {
        StoreBackend::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.sqlite_path).parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            tracing::info!(path = %config.sqlite_path, "Using SQLite island store");
            Arc::new(SqliteIslandStore::new(&config.sqlite_path, clock.clone()).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory island store - islands are lost on exit");
            Arc::new(InMemoryIslandStore::new())
        }
    };
    let codec = Arc::new(BinaryWorldCodec::new(config.template_dir.clone()));

    let app = App::new(config, store, codec, clock);

    let cancel_token = CancellationToken::new();
    setup_shutdown_signal(cancel_token.clone());

    let sweeper = tokio::spawn(run_vacancy_sweeper(
        app.use_cases.sweep.clone(),
        app.config.sweep_interval,
        cancel_token.clone(),
    ));

    cancel_token.cancelled().await;

    tracing::info!("Waiting for sweeper to stop...");
    let _ = tokio::time::timeout(Duration::from_secs(10), sweeper).await;

    // Worlds still held by viewers are saved but stay loaded until exit.
    let report = app.use_cases.save_all.execute().await;
    if report.failed > 0 {
        tracing::error!(failed = report.failed, "Some islands could not be saved");
    }

    tracing::info!("Skyisle Engine shutdown complete");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

/// Cancel `cancel_token` on Ctrl+C or SIGTERM.
fn setup_shutdown_signal(cancel_token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }

        cancel_token.cancel();
    });
}
