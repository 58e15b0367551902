//! Nuance Client - maintenance CLI for the client-side cache
//!
//! Sweeps, inspects and watches the durable TTL store, and checks that the
//! coaching service is reachable.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nuance_client::cache::{FileStorage, Namespace, TtlStore};
use nuance_client::{spawn_cleanup_task, ApiClient, Config};

/// Maintenance commands for the Nuance client cache.
#[derive(Parser, Debug)]
#[command(name = "nuance-client", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove expired and malformed records once
    Sweep,
    /// Sweep at the configured interval until interrupted
    Watch,
    /// Print the live entries of a namespace (chat, article, analysis) as JSON
    List { namespace: Namespace },
    /// Print store statistics as JSON
    Stats,
    /// Check that the coaching service is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nuance_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Sweep => {
            let mut store = open_store(&config)?;
            let removed = store.cleanup();
            info!("Swept {}: removed {} records", config.storage_path.display(), removed);
        }
        Command::Watch => watch(&config).await?,
        Command::List { namespace } => {
            let mut store = open_store(&config)?;
            let entries = store.list_all::<serde_json::Value>(namespace);
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Stats => {
            let store = open_store(&config)?;
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        Command::Health => {
            let api = ApiClient::from_config(&config)?;
            let health = api.health().await?;
            println!("{} ({})", health.status, health.service);
            if !health.is_healthy() {
                anyhow::bail!("service reported status {}", health.status);
            }
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<TtlStore<FileStorage>> {
    let storage = FileStorage::open(&config.storage_path, Some(config.storage_quota))
        .with_context(|| format!("opening {}", config.storage_path.display()))?;
    Ok(TtlStore::new(storage))
}

/// Sweeps once, then keeps sweeping in the background until shutdown.
async fn watch(config: &Config) -> anyhow::Result<()> {
    let store = Arc::new(RwLock::new(open_store(config)?));
    let removed = store.write().await.cleanup();
    info!(
        "Watching {} (initial sweep removed {} records, interval {}s)",
        config.storage_path.display(),
        removed,
        config.cleanup_interval
    );

    let cleanup_handle =
        spawn_cleanup_task(store, Duration::from_secs(config.cleanup_interval.max(1)));
    shutdown_signal(cleanup_handle).await;
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the cleanup task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
