//! Prometheus metrics for the worker.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use mguard_models::StopReason;

use crate::error::{WorkerError, WorkerResult};
use crate::moderation::Stage;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "mguard_jobs_total";
    pub const HARD_STOPS_TOTAL: &str = "mguard_hard_stops_total";
    pub const CLASSIFIER_FAILURES_TOTAL: &str = "mguard_classifier_failures_total";
    pub const PERSIST_TOTAL: &str = "mguard_persist_total";
    pub const JOB_DURATION_SECONDS: &str = "mguard_job_duration_seconds";
}

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn install_exporter(port: u16) -> WorkerResult<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| WorkerError::config_error(format!("metrics exporter: {}", e)))
}

/// Record a finished job. `outcome` is `completed`, `hard_stop` or a rejection kind.
pub fn record_job(outcome: &'static str, started: Instant) {
    counter!(names::JOBS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::JOB_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
}

pub fn record_hard_stop(reason: StopReason) {
    counter!(names::HARD_STOPS_TOTAL, "reason" => reason.as_str()).increment(1);
}

pub fn record_classifier_failure(stage: Stage) {
    counter!(names::CLASSIFIER_FAILURES_TOTAL, "stage" => stage.as_str()).increment(1);
}

pub fn record_persist(success: bool) {
    let label = if success { "true" } else { "false" };
    counter!(names::PERSIST_TOTAL, "success" => label).increment(1);
}
