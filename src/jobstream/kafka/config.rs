//! Configuration for provisioning, publishing, and subscribing, with
//! defaults matching the broker literals this layer was built around.

use crate::jobstream::kafka::error::JobStreamError;
use std::time::Duration;

/// Target layout for a provisioned topic.
///
/// Provisioning with the same spec is idempotent; `reset_on_provision`
/// opts into deleting any existing topic first, which discards its data
/// and is therefore off by default.
#[derive(Debug, Clone)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i32,
    pub reset_on_provision: bool,
}

impl TopicSpec {
    pub fn new(name: impl Into<String>, partitions: i32) -> Self {
        Self {
            name: name.into(),
            partitions,
            replication_factor: 1,
            reset_on_provision: false,
        }
    }

    pub fn replication_factor(mut self, factor: i32) -> Self {
        self.replication_factor = factor;
        self
    }

    pub fn reset_on_provision(mut self, reset: bool) -> Self {
        self.reset_on_provision = reset;
        self
    }

    pub fn validate(&self) -> Result<(), JobStreamError> {
        if self.name.is_empty() {
            return Err(JobStreamError::Config("topic name is empty".to_string()));
        }
        if self.partitions < 1 {
            return Err(JobStreamError::Config(format!(
                "topic '{}' needs at least 1 partition, got {}",
                self.name, self.partitions
            )));
        }
        if self.replication_factor < 1 {
            return Err(JobStreamError::Config(format!(
                "topic '{}' needs a replication factor of at least 1, got {}",
                self.name, self.replication_factor
            )));
        }
        Ok(())
    }
}

/// Settings for the broker readiness probe.
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Attempt budget before giving up.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl ProberConfig {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Settle intervals for topic provisioning.
///
/// Deletion and creation are asynchronous on the broker side; the settle
/// waits give metadata time to propagate before clients attach.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub delete_settle: Duration,
    pub create_settle: Duration,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            delete_settle: Duration::from_secs(2),
            create_settle: Duration::from_secs(1),
        }
    }
}

impl ProvisionerConfig {
    pub fn delete_settle(mut self, settle: Duration) -> Self {
        self.delete_settle = settle;
        self
    }

    pub fn create_settle(mut self, settle: Duration) -> Self {
        self.create_settle = settle;
        self
    }
}

/// Settings for batch publishing.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Partition count of the target topic; the routing modulus.
    pub partitions: i32,
    /// Pacing delay after each delivered job.
    pub inter_message_delay: Duration,
}

impl PublisherConfig {
    pub fn new(partitions: i32) -> Self {
        Self {
            partitions,
            inter_message_delay: Duration::from_millis(100),
        }
    }

    pub fn inter_message_delay(mut self, delay: Duration) -> Self {
        self.inter_message_delay = delay;
        self
    }
}

/// Growth policy for the subscriber's broker-error backoff.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub ceiling: Duration,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            ceiling: Duration::from_secs(10),
            multiplier: 1.5,
        }
    }
}

/// Consumer-group partition assignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStrategy {
    /// Contiguous partition ranges per worker.
    Range,
    RoundRobin,
    CooperativeSticky,
}

impl AssignmentStrategy {
    /// The librdkafka configuration value.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStrategy::Range => "range",
            AssignmentStrategy::RoundRobin => "roundrobin",
            AssignmentStrategy::CooperativeSticky => "cooperative-sticky",
        }
    }
}

impl Default for AssignmentStrategy {
    fn default() -> Self {
        AssignmentStrategy::Range
    }
}

/// Where a new consumer group starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetReset {
    /// Start from the earliest retained offset, picking up existing jobs.
    Earliest,
    Latest,
}

impl OffsetReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }
}

impl Default for OffsetReset {
    fn default() -> Self {
        OffsetReset::Earliest
    }
}

/// Configuration for one subscriber worker.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Comma-separated bootstrap servers.
    pub brokers: String,
    /// Consumer group; the broker splits partitions among its workers.
    pub group_id: String,
    pub client_id: Option<String>,
    pub assignment_strategy: AssignmentStrategy,
    pub offset_reset: OffsetReset,
    /// Upper bound on one blocking read.
    pub poll_timeout: Duration,
    /// Fixed delay after a no-data or coordinator-not-ready poll.
    pub transient_delay: Duration,
    /// Pacing delay after each processed job.
    pub processing_delay: Duration,
    /// Emit one diagnostic per this many consecutive transient polls.
    pub log_interval: u32,
    pub backoff: BackoffPolicy,
}

impl SubscriberConfig {
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            client_id: None,
            assignment_strategy: AssignmentStrategy::default(),
            offset_reset: OffsetReset::default(),
            poll_timeout: Duration::from_secs(10),
            transient_delay: Duration::from_secs(1),
            processing_delay: Duration::from_millis(200),
            log_interval: 5,
            backoff: BackoffPolicy::default(),
        }
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn assignment_strategy(mut self, strategy: AssignmentStrategy) -> Self {
        self.assignment_strategy = strategy;
        self
    }

    pub fn offset_reset(mut self, reset: OffsetReset) -> Self {
        self.offset_reset = reset;
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn transient_delay(mut self, delay: Duration) -> Self {
        self.transient_delay = delay;
        self
    }

    pub fn processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    pub fn log_interval(mut self, interval: u32) -> Self {
        self.log_interval = interval.max(1);
        self
    }

    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }
}
