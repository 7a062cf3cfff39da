//! Moderation queue on a Redis list.
//!
//! Producers `LPUSH`, workers `BRPOP`; the pop is atomic so any number of
//! workers can share one list.

use std::time::Duration;

use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::QueueResult;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// List the upload events are pushed to
    pub queue_name: String,
    /// How long a single `BRPOP` blocks
    pub brpop_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379/0".to_string(),
            queue_name: "fliqz_moderation_image_video_queue".to_string(),
            brpop_timeout: Duration::from_secs(5),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    ///
    /// `REDIS_URL` wins; otherwise the URL is built from `REDIS_HOST`,
    /// `REDIS_PORT`, `REDIS_DB` and an optional `REDIS_PASSWORD`.
    pub fn from_env() -> Self {
        let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| {
            let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port: u16 = std::env::var("REDIS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6379);
            let db: u32 = std::env::var("REDIS_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            let password = std::env::var("REDIS_PASSWORD").ok();
            build_redis_url(&host, port, db, password.as_deref())
        });

        Self {
            redis_url,
            queue_name: std::env::var("INPUT_QUEUE")
                .unwrap_or_else(|_| "fliqz_moderation_image_video_queue".to_string()),
            brpop_timeout: Duration::from_secs(
                std::env::var("REDIS_BRPOP_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

fn build_redis_url(host: &str, port: u16, db: u32, password: Option<&str>) -> String {
    match password.filter(|p| !p.is_empty()) {
        Some(password) => format!("redis://:{}@{}:{}/{}", password, host, port, db),
        None => format!("redis://{}:{}/{}", host, port, db),
    }
}

/// Moderation queue client.
pub struct ModerationQueue {
    client: redis::Client,
    config: QueueConfig,
}

impl ModerationQueue {
    /// Create a new queue client. Does not connect yet.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Block up to the configured timeout for the next raw message.
    pub async fn pop(&self) -> QueueResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let item: Option<(String, String)> = conn
            .brpop(&self.config.queue_name, self.config.brpop_timeout.as_secs_f64())
            .await?;

        Ok(item.map(|(_, payload)| {
            debug!(queue = %self.config.queue_name, bytes = payload.len(), "Popped message");
            payload
        }))
    }

    /// Push a raw message the way producers do.
    pub async fn push(&self, payload: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.lpush::<_, _, ()>(&self.config.queue_name, payload).await?;
        info!(queue = %self.config.queue_name, "Pushed message");
        Ok(())
    }

    /// Get queue length.
    pub async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.llen(&self.config.queue_name).await?;
        Ok(len)
    }

    /// Round-trip a `PING`.
    pub async fn ping(&self) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
