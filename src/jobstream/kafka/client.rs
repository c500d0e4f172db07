//! Broker-facing traits and their rdkafka implementations.
//!
//! Each trait is the seam between the decision logic (probing, provisioning,
//! publishing, the subscription loop) and the broker client, so that logic
//! can be exercised against scripted implementations without a broker.
//! Error classification happens here, once, against structured
//! `RDKafkaErrorCode` values.

use crate::jobstream::kafka::config::{SubscriberConfig, TopicSpec};
use crate::jobstream::kafka::error::{classify_consumer_error, AdminError, PollError};
use crate::jobstream::kafka::message::{ConsumedJob, Job};
use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::Message as KafkaMessage;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;

/// A lightweight connectivity check against the broker.
#[async_trait]
pub trait BrokerProbe {
    async fn probe(&self) -> Result<(), KafkaError>;
}

/// Topic metadata operations, with broker responses mapped to [`AdminError`].
#[async_trait]
pub trait TopicAdmin {
    async fn create_topic(&self, spec: &TopicSpec) -> Result<(), AdminError>;
    async fn delete_topic(&self, name: &str) -> Result<(), AdminError>;
    async fn topic_exists(&self, name: &str) -> Result<bool, AdminError>;
    async fn partition_count(&self, name: &str) -> Result<i32, AdminError>;
}

/// Write side of the broker: delivers one job to an explicit partition.
#[async_trait]
pub trait JobSink {
    async fn send(&self, topic: &str, partition: i32, job: &Job) -> Result<(), KafkaError>;
}

/// Read side of the broker: a bounded poll over the worker's assigned
/// partitions, with the failure already classified.
#[async_trait]
pub trait JobSource {
    async fn poll_job(&mut self, timeout: Duration) -> Result<ConsumedJob, PollError>;
}

const ADMIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Readiness probe backed by a cluster metadata fetch.
pub struct KafkaProbe {
    client: AdminClient<DefaultClientContext>,
}

impl KafkaProbe {
    pub fn new(brokers: &str) -> Result<Self, KafkaError> {
        let client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", "jobstream-probe")
            .create()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BrokerProbe for KafkaProbe {
    async fn probe(&self) -> Result<(), KafkaError> {
        self.client
            .inner()
            .fetch_metadata(None, METADATA_TIMEOUT)
            .map(|_| ())
    }
}

/// Topic admin backed by the rdkafka admin client, which routes metadata
/// changes to the current controller node itself.
pub struct KafkaTopicAdmin {
    admin: AdminClient<DefaultClientContext>,
}

impl KafkaTopicAdmin {
    pub fn new(brokers: &str) -> Result<Self, KafkaError> {
        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", "jobstream-admin")
            .create()?;
        Ok(Self { admin })
    }

    fn admin_options(&self) -> AdminOptions {
        AdminOptions::new()
            .operation_timeout(Some(ADMIN_REQUEST_TIMEOUT))
            .request_timeout(Some(ADMIN_REQUEST_TIMEOUT))
    }
}

#[async_trait]
impl TopicAdmin for KafkaTopicAdmin {
    async fn create_topic(&self, spec: &TopicSpec) -> Result<(), AdminError> {
        let topic = NewTopic::new(
            &spec.name,
            spec.partitions,
            TopicReplication::Fixed(spec.replication_factor),
        );

        let results = self
            .admin
            .create_topics(&[topic], &self.admin_options())
            .await?;

        for result in results {
            match result {
                Ok(_) => {}
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    return Err(AdminError::AlreadyExists(name));
                }
                Err((name, code)) => {
                    return Err(AdminError::Rejected { topic: name, code });
                }
            }
        }
        Ok(())
    }

    async fn delete_topic(&self, name: &str) -> Result<(), AdminError> {
        let results = self
            .admin
            .delete_topics(&[name], &self.admin_options())
            .await?;

        for result in results {
            match result {
                Ok(_) => {}
                Err((topic, RDKafkaErrorCode::UnknownTopicOrPartition)) => {
                    return Err(AdminError::NotFound(topic));
                }
                Err((topic, code)) => {
                    return Err(AdminError::Rejected { topic, code });
                }
            }
        }
        Ok(())
    }

    async fn topic_exists(&self, name: &str) -> Result<bool, AdminError> {
        let metadata = self
            .admin
            .inner()
            .fetch_metadata(Some(name), METADATA_TIMEOUT)?;

        Ok(metadata
            .topics()
            .iter()
            .any(|topic| topic.name() == name && topic.error().is_none()))
    }

    async fn partition_count(&self, name: &str) -> Result<i32, AdminError> {
        let metadata = self
            .admin
            .inner()
            .fetch_metadata(Some(name), METADATA_TIMEOUT)?;

        for topic in metadata.topics() {
            if topic.name() == name && topic.error().is_none() {
                return Ok(topic.partitions().len() as i32);
            }
        }
        Err(AdminError::NotFound(name.to_string()))
    }
}

/// Job sink backed by an rdkafka `FutureProducer`.
pub struct KafkaJobSink {
    producer: FutureProducer,
}

impl KafkaJobSink {
    pub fn new(brokers: &str) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;
        Ok(Self { producer })
    }
}

#[async_trait]
impl JobSink for KafkaJobSink {
    async fn send(&self, topic: &str, partition: i32, job: &Job) -> Result<(), KafkaError> {
        let record = FutureRecord::to(topic)
            .key(&job.key)
            .payload(&job.payload)
            .partition(partition);

        match self.producer.send(record, Timeout::After(SEND_TIMEOUT)).await {
            Ok(delivery) => {
                debug!(
                    "Delivered job to '{}' partition {} at offset {}",
                    topic, delivery.0, delivery.1
                );
                Ok(())
            }
            Err((err, _)) => Err(err),
        }
    }
}

/// Job source backed by an rdkafka `StreamConsumer` in a consumer group.
///
/// Dropping the source leaves the group and releases the connection, so a
/// cancelled worker cleans up by returning.
pub struct KafkaJobSource {
    consumer: StreamConsumer,
}

impl KafkaJobSource {
    pub fn new(config: &SubscriberConfig, topic: &str) -> Result<Self, KafkaError> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", config.offset_reset.as_str())
            .set(
                "partition.assignment.strategy",
                config.assignment_strategy.as_str(),
            )
            // Offsets are committed behind the polled position, giving
            // at-least-once delivery to the callback.
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "3000");
        if let Some(client_id) = config.client_id.as_deref() {
            client_config.set("client.id", client_id);
        }

        let consumer: StreamConsumer = client_config.create()?;
        consumer.subscribe(&[topic])?;

        Ok(Self { consumer })
    }
}

#[async_trait]
impl JobSource for KafkaJobSource {
    async fn poll_job(&mut self, timeout: Duration) -> Result<ConsumedJob, PollError> {
        let mut stream = self.consumer.stream();

        match tokio::time::timeout(timeout, stream.next()).await {
            Ok(Some(Ok(msg))) => Ok(ConsumedJob {
                payload: msg.payload().map(|p| p.to_vec()).unwrap_or_default(),
                partition: msg.partition(),
                offset: msg.offset(),
            }),
            Ok(Some(Err(e))) => Err(classify_consumer_error(e)),
            Ok(None) => Err(PollError::Idle),
            Err(_) => Err(PollError::Idle),
        }
    }
}
