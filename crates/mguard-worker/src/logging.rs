//! Structured job logging.
//!
//! Every event carries the job ID and operation so a single moderation run
//! can be followed through the cascade.

use tracing::{error, info, warn, Span};

use mguard_models::{JobId, StopReason};

use crate::moderation::Stage;

/// Job logger carrying job ID and operation.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn from_string(job_id: &str, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    /// Log a stage result.
    pub fn log_stage(&self, stage: Stage, outcome: bool) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = stage.as_str(),
            outcome,
            "Stage evaluated"
        );
    }

    /// Log a classifier failure that was treated as a negative signal.
    pub fn log_classifier_failure(&self, stage: Stage, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = stage.as_str(),
            "Classifier failed, treating as negative: {}", message
        );
    }

    pub fn log_hard_stop(&self, stage: Stage, reason: StopReason) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            stage = stage.as_str(),
            reason = reason.as_str(),
            "Hard stop"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}
