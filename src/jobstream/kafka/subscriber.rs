//! The resilient subscription loop.
//!
//! One worker polls its assigned partitions forever, classifying every
//! failed poll and applying a per-class recovery delay. No broker condition
//! terminates the loop; only the shutdown signal does.

use crate::jobstream::kafka::backoff::WorkerState;
use crate::jobstream::kafka::client::JobSource;
use crate::jobstream::kafka::config::SubscriberConfig;
use crate::jobstream::kafka::error::PollError;
use crate::jobstream::kafka::message::ConsumedJob;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::broadcast;

/// Runs one worker's consumption loop until cancelled.
///
/// Spawn one `run` call per worker task; the broker splits the topic's
/// partitions among the workers of a consumer group. The callback receives
/// each job in partition order, as delivered; whatever it does with the job
/// is not this loop's concern.
///
/// # Examples
///
/// ```rust,no_run
/// use jobstream::{KafkaJobSource, ResilientSubscriber, ShutdownCoordinator, SubscriberConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SubscriberConfig::new("localhost:9092", "worker-group");
/// let shutdown = ShutdownCoordinator::new();
///
/// for worker in 0..2 {
///     let source = KafkaJobSource::new(&config, "jobs")?;
///     let subscriber = ResilientSubscriber::new(config.clone());
///     let rx = shutdown.subscribe();
///     tokio::spawn(async move {
///         subscriber
///             .run(source, move |job| {
///                 println!(
///                     "worker {} consumed partition={} offset={}",
///                     worker, job.partition, job.offset
///                 );
///             }, rx)
///             .await;
///     });
/// }
///
/// // ... later
/// shutdown.trigger();
/// # Ok(())
/// # }
/// ```
pub struct ResilientSubscriber {
    config: SubscriberConfig,
}

impl ResilientSubscriber {
    pub fn new(config: SubscriberConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// Polls `source` until the shutdown signal fires, then drops it,
    /// releasing its broker connection.
    pub async fn run<S, F>(
        &self,
        mut source: S,
        mut on_message: F,
        mut shutdown: broadcast::Receiver<()>,
    ) where
        S: JobSource + Send,
        F: FnMut(ConsumedJob) + Send,
    {
        let config = &self.config;
        let log_interval = config.log_interval.max(1);
        let mut state = WorkerState::new(&config.backoff);
        info!("Subscriber worker started (group '{}')", config.group_id);

        loop {
            let outcome = tokio::select! {
                _ = shutdown.recv() => break,
                outcome = source.poll_job(config.poll_timeout) => outcome,
            };

            match outcome {
                Ok(job) => {
                    if state.consecutive_transient() > 0
                        || state.current_backoff() > config.backoff.base
                    {
                        debug!("Read succeeded, clearing backoff state");
                    }
                    state.reset(&config.backoff);
                    on_message(job);
                    if pause(config.processing_delay, &mut shutdown).await {
                        break;
                    }
                }
                Err(PollError::Idle) => {
                    let count = state.record_transient();
                    if count % log_interval == 0 {
                        info!("Waiting for jobs... (checked {} times)", count);
                    }
                    if pause(config.transient_delay, &mut shutdown).await {
                        break;
                    }
                }
                Err(PollError::CoordinatorNotReady) => {
                    let count = state.record_transient();
                    if count % log_interval == 0 {
                        info!(
                            "Waiting for the group coordinator to come up... (attempt {})",
                            count
                        );
                    }
                    if pause(config.transient_delay, &mut shutdown).await {
                        break;
                    }
                }
                Err(PollError::Broker(e)) => {
                    let delay = state.record_broker_error(&config.backoff);
                    warn!("Broker error: {}; retrying in {:?}", e, delay);
                    if pause(delay, &mut shutdown).await {
                        break;
                    }
                }
            }
        }

        info!("Subscriber worker stopped (group '{}')", config.group_id);
    }
}

/// Sleeps for `delay` unless the shutdown signal fires first; returns true
/// on cancellation.
async fn pause(delay: Duration, shutdown: &mut broadcast::Receiver<()>) -> bool {
    if delay.is_zero() {
        return false;
    }
    tokio::select! {
        _ = shutdown.recv() => true,
        _ = tokio::time::sleep(delay) => false,
    }
}
