//! Exponential backoff for transport failures.
//!
//! The worker never gives up on the queue: it sleeps between attempts and
//! stops logging every failure once an outage is clearly ongoing.

use std::time::Duration;

use tracing::{error, info, warn};

/// Configuration for backoff behavior.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay after the first failure (doubles each consecutive failure).
    pub base_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Consecutive failures logged individually before suppression kicks in.
    pub log_burst: u32,
    /// While suppressed, log one in every `log_every` failures.
    pub log_every: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            log_burst: 5,
            log_every: 20,
        }
    }
}

impl BackoffConfig {
    /// Calculate delay for a given consecutive failure count (1-based).
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(31);
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(exponent));
        delay.min(self.max_delay)
    }
}

/// Tracks consecutive transport failures for one loop.
#[derive(Debug)]
pub struct FailureTracker {
    config: BackoffConfig,
    operation: &'static str,
    consecutive: u32,
}

impl FailureTracker {
    pub fn new(operation: &'static str, config: BackoffConfig) -> Self {
        Self {
            config,
            operation,
            consecutive: 0,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive
    }

    /// Record a failure and return how long to wait before retrying.
    pub fn record_failure(&mut self, err: &dyn std::fmt::Display) -> Duration {
        self.consecutive = self.consecutive.saturating_add(1);
        let delay = self.config.delay_for_attempt(self.consecutive);

        if self.should_log() {
            warn!(
                operation = self.operation,
                failures = self.consecutive,
                delay_ms = delay.as_millis() as u64,
                "Transport failure, backing off: {}",
                err
            );
        }
        if self.consecutive == self.config.log_burst {
            error!(
                operation = self.operation,
                failures = self.consecutive,
                "Transport keeps failing, suppressing further logs"
            );
        }

        delay
    }

    /// Record a success, resetting the failure streak.
    pub fn record_success(&mut self) {
        if self.consecutive > 0 {
            info!(
                operation = self.operation,
                failures = self.consecutive,
                "Transport recovered"
            );
        }
        self.consecutive = 0;
    }

    /// Whether the current failure should be logged.
    pub fn should_log(&self) -> bool {
        if self.consecutive <= self.config.log_burst {
            return true;
        }
        let every = self.config.log_every.max(1);
        (self.consecutive - self.config.log_burst) % every == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_for_attempt() {
        let config = BackoffConfig::default();
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(16));
        assert_eq!(config.delay_for_attempt(6), Duration::from_secs(30));
        assert_eq!(config.delay_for_attempt(500), Duration::from_secs(30));
    }

    #[test]
    fn test_tracker_resets_on_success() {
        let mut tracker = FailureTracker::new("queue_pop", BackoffConfig::default());
        tracker.record_failure(&"down");
        let delay = tracker.record_failure(&"down");
        assert_eq!(delay, Duration::from_secs(2));
        assert_eq!(tracker.consecutive_failures(), 2);

        tracker.record_success();
        assert_eq!(tracker.consecutive_failures(), 0);
        assert_eq!(tracker.record_failure(&"down"), Duration::from_secs(1));
    }

    #[test]
    fn test_log_suppression() {
        let config = BackoffConfig {
            log_burst: 2,
            log_every: 3,
            ..Default::default()
        };
        let mut tracker = FailureTracker::new("queue_pop", config);

        let logged: Vec<bool> = (0..8)
            .map(|_| {
                tracker.record_failure(&"down");
                tracker.should_log()
            })
            .collect();

        assert_eq!(
            logged,
            vec![true, true, false, false, true, false, false, true]
        );
    }
}
