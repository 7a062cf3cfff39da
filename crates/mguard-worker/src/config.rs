//! Worker configuration.

use std::time::Duration;

use mguard_media::SamplerConfig;

use crate::backoff::BackoffConfig;
use crate::moderation::VotePolicy;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Keyframe sampling for videos
    pub sampler: SamplerConfig,
    /// Width decoded video frames are scaled down to (None keeps source size)
    pub decode_width: Option<u32>,
    /// Keyframe voting policy
    pub votes: VotePolicy,
    /// Pause after an empty pop
    pub idle_sleep: Duration,
    /// Backoff after transport failures
    pub backoff: BackoffConfig,
    /// Prometheus exporter port (disabled when unset)
    pub metrics_port: Option<u16>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            decode_width: Some(640),
            votes: VotePolicy::default(),
            idle_sleep: Duration::from_millis(100),
            backoff: BackoffConfig::default(),
            metrics_port: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            sampler: SamplerConfig {
                max_frames: env_parse("SAMPLER_MAX_FRAMES").unwrap_or(defaults.sampler.max_frames),
                scene_threshold: env_parse("SAMPLER_SCENE_THRESHOLD")
                    .unwrap_or(defaults.sampler.scene_threshold),
            },
            // 0 disables downscaling
            decode_width: match env_parse::<u32>("SAMPLER_DECODE_WIDTH") {
                Some(0) => None,
                Some(width) => Some(width),
                None => defaults.decode_width,
            },
            votes: VotePolicy::new(
                env_parse("VOTE_MIN_HITS")
                    .filter(|hits: &u32| *hits > 0)
                    .unwrap_or(defaults.votes.min_hits()),
                env_parse("VOTE_MIN_RATIO").unwrap_or(defaults.votes.min_ratio()),
            ),
            idle_sleep: Duration::from_millis(
                env_parse("WORKER_IDLE_SLEEP_MS").unwrap_or(100),
            ),
            backoff: BackoffConfig {
                base_delay: Duration::from_millis(
                    env_parse("WORKER_BACKOFF_BASE_MS").unwrap_or(1000),
                ),
                max_delay: Duration::from_millis(
                    env_parse("WORKER_BACKOFF_MAX_MS").unwrap_or(30_000),
                ),
                ..defaults.backoff
            },
            metrics_port: env_parse("METRICS_PORT"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}
