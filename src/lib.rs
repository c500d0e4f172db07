//! # jobstream
//!
//! A client-side job-distribution layer for Apache Kafka: publish units of
//! work into a partitioned topic and consume them with at-least-once
//! semantics, surviving broker unavailability, slow startup, and transient
//! read/write failures without operator intervention.
//!
//! ## Features
//!
//! - **Readiness probing**: block startup until the broker answers, with a
//!   bounded attempt budget
//! - **Idempotent provisioning**: ensure a topic exists with the target
//!   partition layout; re-running is a no-op
//! - **Deterministic routing**: jobs are spread across partitions by a
//!   stable hash of their key
//! - **Resilient consumption**: per-worker loops that classify broker
//!   failures and apply distinct backoff per class, never crashing on
//!   transient conditions
//! - Built on `rdkafka` and `tokio`; broker-facing trait seams keep every
//!   policy testable without a broker
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobstream::{
//!     ensure_topic, publish_batch, wait_until_ready, Job, KafkaJobSink, KafkaProbe,
//!     KafkaTopicAdmin, ProberConfig, ProvisionerConfig, PublisherConfig, TopicSpec,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brokers = "localhost:9092";
//!
//!     // Block until the broker answers, then provision the topic.
//!     let probe = KafkaProbe::new(brokers)?;
//!     wait_until_ready(&probe, &ProberConfig::default()).await?;
//!
//!     let admin = KafkaTopicAdmin::new(brokers)?;
//!     let spec = TopicSpec::new("jobs", 3);
//!     ensure_topic(&admin, &spec, &ProvisionerConfig::default()).await?;
//!
//!     // Publish a batch, key-routed across the partitions.
//!     let sink = KafkaJobSink::new(brokers)?;
//!     let jobs: Vec<Job> = (0..10)
//!         .map(|i| Job::new(format!("p1-m{}", i), format!("job-{}", i)))
//!         .collect();
//!     let published = publish_batch(&sink, "jobs", &jobs, &PublisherConfig::new(3)).await?;
//!     println!("published {} jobs", published);
//!
//!     Ok(())
//! }
//! ```
//!
//! Consumption runs one [`ResilientSubscriber`] per worker task under a
//! shared consumer group; see [`jobstream::kafka::subscriber`] for the loop
//! and its cancellation contract.

pub mod jobstream;

// Re-export the main API at the crate root for easy access
pub use jobstream::kafka::{
    ensure_topic,
    fnv1a_32,
    partition_for_key,
    publish_batch,
    wait_until_ready,
    AdminError,
    AssignmentStrategy,
    BackoffPolicy,
    // Traits
    BrokerProbe,
    ConsumedJob,
    // Core types
    Job,
    JobSink,
    JobSource,
    // Errors
    JobStreamError,
    // Kafka-backed implementations
    KafkaJobSink,
    KafkaJobSource,
    KafkaProbe,
    KafkaTopicAdmin,
    OffsetReset,
    PollError,
    // Configuration
    ProberConfig,
    ProvisionerConfig,
    PublisherConfig,
    ResilientSubscriber,
    ShutdownCoordinator,
    SubscriberConfig,
    TopicAdmin,
    TopicSpec,
    WorkerState,
};
