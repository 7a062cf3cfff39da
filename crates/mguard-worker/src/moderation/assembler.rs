//! Verdict persistence.

use tracing::{error, info, warn};

use mguard_models::{ModerationJob, Verdict};
use mguard_store::{FlagSet, UpdateStatus, VerdictStore};

use crate::metrics;

/// Result of writing a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    pub success: bool,
    pub status: String,
}

/// Writes verdicts through a [`VerdictStore`]. One attempt per job.
pub struct VerdictAssembler<S> {
    store: S,
}

impl<S: VerdictStore> VerdictAssembler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn persist(&self, job: &ModerationJob, verdict: &Verdict) -> PersistOutcome {
        let flags = FlagSet::from(verdict);
        let verdict_json = serde_json::to_string(verdict).unwrap_or_default();

        let outcome = match self.store.update(&job.record, &flags).await {
            Ok(UpdateStatus::NoRowsAffected) => {
                warn!(
                    job_id = %job.job_id,
                    record = %job.record,
                    verdict = %verdict_json,
                    "Verdict update matched no changed rows"
                );
                PersistOutcome {
                    success: true,
                    status: UpdateStatus::NoRowsAffected.to_string(),
                }
            }
            Ok(status) => {
                info!(
                    job_id = %job.job_id,
                    record = %job.record,
                    verdict = %verdict_json,
                    status = %status,
                    "Verdict persisted"
                );
                PersistOutcome {
                    success: true,
                    status: status.to_string(),
                }
            }
            Err(e) => {
                error!(
                    job_id = %job.job_id,
                    record = %job.record,
                    verdict = %verdict_json,
                    "Failed to persist verdict: {}", e
                );
                PersistOutcome {
                    success: false,
                    status: e.to_string(),
                }
            }
        };

        metrics::record_persist(outcome.success);
        outcome
    }
}
