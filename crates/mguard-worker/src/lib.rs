//! Media moderation worker.
//!
//! This crate provides:
//! - Per-label confidence thresholds
//! - Keyframe vote aggregation for videos
//! - The moderation cascade with early exits
//! - Verdict persistence
//! - The queue consumption loop with transport backoff

pub mod backoff;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod moderation;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use moderation::{
    CascadeOutcome, ModerationCascade, PersistOutcome, Stage, ThresholdTable, VerdictAssembler,
    VotePolicy,
};
