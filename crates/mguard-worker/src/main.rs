//! Media moderation worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mguard_media::StorageRoots;
use mguard_ml_client::MlClient;
use mguard_queue::ModerationQueue;
use mguard_store::MySqlVerdictStore;
use mguard_worker::{metrics, JobExecutor, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("mguard=info".parse().unwrap())
        .add_directive("sqlx=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting mguard-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    if let Some(port) = config.metrics_port {
        match metrics::install_exporter(port) {
            Ok(()) => info!(port, "Prometheus exporter listening"),
            Err(e) => error!("Failed to install metrics exporter: {}", e),
        }
    }

    let roots = StorageRoots::from_env();
    info!(roots = ?roots.roots(), "Storage roots");

    let queue = match ModerationQueue::from_env() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create moderation queue: {}", e);
            std::process::exit(1);
        }
    };

    let classifier = match MlClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create classifier client: {}", e);
            std::process::exit(1);
        }
    };

    let store = match MySqlVerdictStore::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create verdict store: {}", e);
            std::process::exit(1);
        }
    };

    let executor = Arc::new(JobExecutor::new(config, queue, roots, classifier, store.clone()));

    let signal_executor = Arc::clone(&executor);
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal, finishing current job");
        signal_executor.shutdown();
    });

    if let Err(e) = executor.run().await {
        error!("Executor error: {}", e);
        std::process::exit(1);
    }

    store.close().await;
    info!("Worker shutdown complete");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    tokio::signal::ctrl_c().await.ok();
}
