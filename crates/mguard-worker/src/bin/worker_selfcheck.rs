//! Deployment self-check: verifies every collaborator the worker needs.

use mguard_media::StorageRoots;
use mguard_ml_client::MlClient;
use mguard_queue::ModerationQueue;
use mguard_store::MySqlVerdictStore;
use mguard_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env();
    println!(
        "worker-selfcheck: starting (max_frames={}, scene_threshold={})",
        config.sampler.max_frames, config.sampler.scene_threshold
    );

    ensure_binary("ffmpeg")?;
    ensure_binary("ffprobe")?;
    ensure_storage_roots(&StorageRoots::from_env())?;
    ensure_queue().await?;
    ensure_classifier().await?;
    ensure_database().await?;

    println!("worker-selfcheck: ok");
    Ok(())
}

fn ensure_binary(name: &str) -> anyhow::Result<()> {
    let path = which::which(name).map_err(|e| anyhow::anyhow!("{} not available: {}", name, e))?;
    println!("worker-selfcheck: {} at {}", name, path.display());
    Ok(())
}

fn ensure_storage_roots(roots: &StorageRoots) -> anyhow::Result<()> {
    let existing = roots.roots().iter().filter(|r| r.is_dir()).count();
    if existing == 0 {
        return Err(anyhow::anyhow!(
            "none of the storage roots exist: {:?}",
            roots.roots()
        ));
    }
    println!(
        "worker-selfcheck: {}/{} storage roots present",
        existing,
        roots.roots().len()
    );
    Ok(())
}

async fn ensure_queue() -> anyhow::Result<()> {
    let queue = ModerationQueue::from_env()?;
    queue.ping().await?;
    let depth = queue.len().await?;
    println!(
        "worker-selfcheck: redis ok, {} has {} pending",
        queue.config().queue_name,
        depth
    );
    Ok(())
}

async fn ensure_classifier() -> anyhow::Result<()> {
    let client = MlClient::from_env()?;
    if !client.health_check().await? {
        return Err(anyhow::anyhow!(
            "inference service at {} is unhealthy",
            client.config().base_url
        ));
    }
    println!("worker-selfcheck: inference service ok");
    Ok(())
}

async fn ensure_database() -> anyhow::Result<()> {
    let store = MySqlVerdictStore::from_env()?;
    store.ping().await?;
    store.close().await;
    println!("worker-selfcheck: database ok");
    Ok(())
}
