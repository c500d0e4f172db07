//! Per-worker failure memory for the subscription loop.

use crate::jobstream::kafka::config::BackoffPolicy;
use std::time::Duration;

/// Failure bookkeeping owned by exactly one subscriber worker.
///
/// Transient polls (no data, coordinator not ready) only bump a counter
/// used for log rate-limiting; genuine broker errors grow the retry delay
/// multiplicatively up to the policy ceiling. Any successful read clears
/// both.
#[derive(Debug, Clone)]
pub struct WorkerState {
    current_backoff: Duration,
    consecutive_transient: u32,
}

impl WorkerState {
    pub fn new(policy: &BackoffPolicy) -> Self {
        Self {
            current_backoff: policy.base,
            consecutive_transient: 0,
        }
    }

    /// Records a transient poll; returns the running count for the
    /// noise-reduction check. Does not touch the backoff delay.
    pub fn record_transient(&mut self) -> u32 {
        self.consecutive_transient = self.consecutive_transient.saturating_add(1);
        self.consecutive_transient
    }

    /// Returns the delay to sleep for this broker error, then grows the
    /// next delay by the policy multiplier, capped at the ceiling.
    pub fn record_broker_error(&mut self, policy: &BackoffPolicy) -> Duration {
        let delay = self.current_backoff;
        self.current_backoff = self
            .current_backoff
            .mul_f64(policy.multiplier)
            .min(policy.ceiling);
        delay
    }

    /// A successful read clears all failure memory.
    pub fn reset(&mut self, policy: &BackoffPolicy) {
        self.current_backoff = policy.base;
        self.consecutive_transient = 0;
    }

    pub fn current_backoff(&self) -> Duration {
        self.current_backoff
    }

    pub fn consecutive_transient(&self) -> u32 {
        self.consecutive_transient
    }
}
