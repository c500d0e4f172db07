//! The Kafka-backed job distribution layer: readiness probing, idempotent
//! topic provisioning, key-routed batch publishing, and the resilient
//! consumer-group subscription loop.

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod partitioner;
pub mod provision;
pub mod publisher;
pub mod readiness;
pub mod shutdown;
pub mod subscriber;

pub use backoff::WorkerState;
pub use client::{
    BrokerProbe, JobSink, JobSource, KafkaJobSink, KafkaJobSource, KafkaProbe, KafkaTopicAdmin,
    TopicAdmin,
};
pub use config::{
    AssignmentStrategy, BackoffPolicy, OffsetReset, ProberConfig, ProvisionerConfig,
    PublisherConfig, SubscriberConfig, TopicSpec,
};
pub use error::{AdminError, JobStreamError, PollError};
pub use message::{ConsumedJob, Job};
pub use partitioner::{fnv1a_32, partition_for_key};
pub use provision::ensure_topic;
pub use publisher::publish_batch;
pub use readiness::wait_until_ready;
pub use shutdown::ShutdownCoordinator;
pub use subscriber::ResilientSubscriber;
