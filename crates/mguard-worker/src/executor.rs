//! Job executor.
//!
//! Pops one upload event at a time, runs the cascade and writes the verdict.
//! Jobs never overlap within a worker; scale out by running more workers on
//! the same list.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use mguard_media::{MediaLoader, StorageRoots};
use mguard_ml_client::Classifier;
use mguard_models::ModerationJob;
use mguard_queue::{ModerationQueue, QueueMessage};
use mguard_store::VerdictStore;

use crate::backoff::FailureTracker;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::moderation::{
    CascadeOutcome, ModerationCascade, PersistOutcome, ThresholdTable, VerdictAssembler,
};

/// What happened to one queue message.
#[derive(Debug)]
pub enum JobReport {
    /// Not valid JSON; dropped.
    Dropped,
    /// Rejected before a verdict existed. Nothing was persisted.
    Rejected(WorkerError),
    Completed {
        job: Box<ModerationJob>,
        outcome: CascadeOutcome,
        persist: PersistOutcome,
    },
}

impl JobReport {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobReport::Completed { .. })
    }
}

/// Job executor that processes upload events from the queue.
pub struct JobExecutor<C, S> {
    config: WorkerConfig,
    queue: ModerationQueue,
    roots: StorageRoots,
    cascade: ModerationCascade<C>,
    assembler: VerdictAssembler<S>,
    shutdown: watch::Sender<bool>,
    worker_name: String,
}

impl<C: Classifier, S: VerdictStore> JobExecutor<C, S> {
    pub fn new(
        config: WorkerConfig,
        queue: ModerationQueue,
        roots: StorageRoots,
        classifier: C,
        store: S,
    ) -> Self {
        let loader = MediaLoader::new(config.sampler.clone(), config.decode_width);
        let cascade =
            ModerationCascade::new(classifier, loader, ThresholdTable::default(), config.votes);
        let (shutdown, _) = watch::channel(false);
        let worker_name = format!("worker-{}", Uuid::new_v4());

        Self {
            config,
            queue,
            roots,
            cascade,
            assembler: VerdictAssembler::new(store),
            shutdown,
            worker_name,
        }
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// Signal shutdown. The job in hand is finished first.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Consume the queue until shutdown.
    pub async fn run(&self) -> WorkerResult<()> {
        info!(
            worker = %self.worker_name,
            queue = %self.queue.config().queue_name,
            "Starting moderation worker"
        );

        let mut shutdown_rx = self.shutdown.subscribe();
        let mut pop_failures = FailureTracker::new("queue_pop", self.config.backoff.clone());

        // A pop in flight is never cancelled: BRPOP returns within its
        // timeout and the flag is checked before the next one.
        while !*shutdown_rx.borrow() {
            match self.queue.pop().await {
                Ok(Some(raw)) => {
                    pop_failures.record_success();
                    self.process_message(&raw).await;
                }
                Ok(None) => {
                    pop_failures.record_success();
                    tokio::time::sleep(self.config.idle_sleep).await;
                }
                Err(e) => {
                    let delay = pop_failures.record_failure(&e);
                    Self::sleep_unless_shutdown(delay, &mut shutdown_rx).await;
                }
            }
        }

        info!(worker = %self.worker_name, "Shutdown signal received, executor stopped");
        Ok(())
    }

    async fn sleep_unless_shutdown(delay: Duration, shutdown_rx: &mut watch::Receiver<bool>) {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_rx.changed() => {}
        }
    }

    /// Handle one raw queue payload end to end.
    pub async fn process_message(&self, raw: &str) -> JobReport {
        let started = Instant::now();

        let message = match QueueMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(worker = %self.worker_name, "Dropping unparseable message: {}", e);
                metrics::record_job("dropped", started);
                return JobReport::Dropped;
            }
        };

        let job = match message.into_job(&self.roots) {
            Ok(job) => job,
            Err(e) => {
                let err = WorkerError::from_rejected_message(e);
                error!(worker = %self.worker_name, kind = err.kind(), "Rejecting message: {}", err);
                metrics::record_job(err.kind(), started);
                return JobReport::Rejected(err);
            }
        };

        let logger = JobLogger::new(&job.job_id, "moderation");
        let span = logger.create_span();
        self.process_job(job, logger, started).instrument(span).await
    }

    async fn process_job(&self, job: ModerationJob, logger: JobLogger, started: Instant) -> JobReport {
        logger.log_start(&format!(
            "{} {} ({})",
            job.media_kind,
            job.record,
            job.path().display()
        ));

        let outcome = match self.cascade.run(&job).await {
            Ok(outcome) => outcome,
            Err(e) => {
                logger.log_error(&format!("rejected ({}): {}", e.kind(), e));
                metrics::record_job(e.kind(), started);
                return JobReport::Rejected(e);
            }
        };

        let persist = self.assembler.persist(&job, &outcome.verdict).await;
        let label = if outcome.verdict.is_hard_stop() {
            "hard_stop"
        } else {
            "completed"
        };
        metrics::record_job(label, started);

        logger.log_completion(&format!(
            "stages={} frames={} persisted={} status={} elapsed_ms={}",
            outcome.stages.len(),
            outcome.frames_evaluated,
            persist.success,
            persist.status,
            started.elapsed().as_millis()
        ));

        JobReport::Completed {
            job: Box::new(job),
            outcome,
            persist,
        }
    }
}
