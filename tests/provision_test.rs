//! Provisioning and readiness against scripted collaborators: idempotence,
//! the reset path, fatal creation failures, and probe budget exhaustion.

use async_trait::async_trait;
use jobstream::{
    ensure_topic, wait_until_ready, AdminError, BrokerProbe, JobStreamError, ProberConfig,
    ProvisionerConfig, TopicAdmin, TopicSpec,
};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AdminCall {
    Delete(String),
    Create(String, i32),
}

/// In-memory broker topic registry recording every admin call.
struct FakeAdmin {
    topics: Mutex<HashMap<String, i32>>,
    calls: Mutex<Vec<AdminCall>>,
    reject_create_with: Option<RDKafkaErrorCode>,
}

impl FakeAdmin {
    fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            reject_create_with: None,
        }
    }

    fn rejecting_create(code: RDKafkaErrorCode) -> Self {
        Self {
            reject_create_with: Some(code),
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<AdminCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TopicAdmin for FakeAdmin {
    async fn create_topic(&self, spec: &TopicSpec) -> Result<(), AdminError> {
        self.calls
            .lock()
            .unwrap()
            .push(AdminCall::Create(spec.name.clone(), spec.partitions));
        if let Some(code) = self.reject_create_with {
            return Err(AdminError::Rejected {
                topic: spec.name.clone(),
                code,
            });
        }
        let mut topics = self.topics.lock().unwrap();
        if topics.contains_key(&spec.name) {
            return Err(AdminError::AlreadyExists(spec.name.clone()));
        }
        topics.insert(spec.name.clone(), spec.partitions);
        Ok(())
    }

    async fn delete_topic(&self, name: &str) -> Result<(), AdminError> {
        self.calls
            .lock()
            .unwrap()
            .push(AdminCall::Delete(name.to_string()));
        if self.topics.lock().unwrap().remove(name).is_none() {
            return Err(AdminError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn topic_exists(&self, name: &str) -> Result<bool, AdminError> {
        Ok(self.topics.lock().unwrap().contains_key(name))
    }

    async fn partition_count(&self, name: &str) -> Result<i32, AdminError> {
        self.topics
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .ok_or_else(|| AdminError::NotFound(name.to_string()))
    }
}

fn fast_settle() -> ProvisionerConfig {
    ProvisionerConfig::default()
        .delete_settle(Duration::ZERO)
        .create_settle(Duration::ZERO)
}

#[tokio::test]
async fn test_provision_then_reprovision_is_idempotent() {
    let admin = FakeAdmin::new();
    let config = fast_settle();

    // First run resets: delete (nothing there) then create.
    let spec = TopicSpec::new("jobs", 3).reset_on_provision(true);
    ensure_topic(&admin, &spec, &config)
        .await
        .expect("first provision should succeed");
    assert!(admin.topic_exists("jobs").await.unwrap());
    assert_eq!(admin.partition_count("jobs").await.unwrap(), 3);

    // Second run without reset: already-exists is the success path, and no
    // delete is issued.
    let spec = TopicSpec::new("jobs", 3);
    ensure_topic(&admin, &spec, &config)
        .await
        .expect("reprovision should be a no-op");
    assert_eq!(admin.partition_count("jobs").await.unwrap(), 3);

    let calls = admin.calls();
    assert_eq!(
        calls,
        vec![
            AdminCall::Delete("jobs".to_string()),
            AdminCall::Create("jobs".to_string(), 3),
            AdminCall::Create("jobs".to_string(), 3),
        ]
    );
}

#[tokio::test]
async fn test_reset_discards_existing_topic() {
    let admin = FakeAdmin::new();
    admin.topics.lock().unwrap().insert("jobs".to_string(), 1);

    let spec = TopicSpec::new("jobs", 3).reset_on_provision(true);
    ensure_topic(&admin, &spec, &fast_settle())
        .await
        .expect("reset provision should succeed");

    // The stale single-partition topic is gone, replaced by the spec layout.
    assert_eq!(admin.partition_count("jobs").await.unwrap(), 3);
}

#[tokio::test]
async fn test_creation_rejection_is_fatal() {
    let admin = FakeAdmin::rejecting_create(RDKafkaErrorCode::InvalidReplicationFactor);

    let spec = TopicSpec::new("jobs", 3).replication_factor(5);
    let err = ensure_topic(&admin, &spec, &fast_settle())
        .await
        .expect_err("rejection should surface");

    match err {
        JobStreamError::Provision(AdminError::Rejected { topic, code }) => {
            assert_eq!(topic, "jobs");
            assert_eq!(code, RDKafkaErrorCode::InvalidReplicationFactor);
        }
        other => panic!("expected Provision error, got {}", other),
    }
}

#[tokio::test]
async fn test_invalid_spec_is_rejected_before_any_call() {
    let admin = FakeAdmin::new();
    let spec = TopicSpec::new("jobs", 0);

    let err = ensure_topic(&admin, &spec, &fast_settle())
        .await
        .expect_err("zero partitions is invalid");
    assert!(matches!(err, JobStreamError::Config(_)));
    assert!(admin.calls().is_empty());
}

/// Probe that never connects, counting attempts.
struct UnreachableProbe {
    attempts: AtomicU32,
}

#[async_trait]
impl BrokerProbe for UnreachableProbe {
    async fn probe(&self) -> Result<(), KafkaError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(KafkaError::MetadataFetch(
            RDKafkaErrorCode::BrokerTransportFailure,
        ))
    }
}

#[tokio::test]
async fn test_probe_budget_exhaustion_blocks_provisioning() {
    let probe = UnreachableProbe {
        attempts: AtomicU32::new(0),
    };
    let admin = FakeAdmin::new();
    let config = ProberConfig::default()
        .max_attempts(10)
        .retry_delay(Duration::ZERO);

    // Mirrors the startup flow: a failed readiness wait short-circuits
    // before any provisioning call is made.
    let spec = TopicSpec::new("jobs", 3);
    let result = match wait_until_ready(&probe, &config).await {
        Ok(()) => ensure_topic(&admin, &spec, &fast_settle()).await,
        Err(e) => Err(e),
    };

    match result.expect_err("broker is unreachable") {
        JobStreamError::Connectivity { attempts } => assert_eq!(attempts, 10),
        other => panic!("expected Connectivity error, got {}", other),
    }
    assert_eq!(probe.attempts.load(Ordering::SeqCst), 10);
    assert!(admin.calls().is_empty());
}

/// Probe that succeeds after a fixed number of refusals.
struct FlakyProbe {
    attempts: AtomicU32,
    succeed_after: u32,
}

#[async_trait]
impl BrokerProbe for FlakyProbe {
    async fn probe(&self) -> Result<(), KafkaError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt > self.succeed_after {
            Ok(())
        } else {
            Err(KafkaError::MetadataFetch(RDKafkaErrorCode::AllBrokersDown))
        }
    }
}

#[tokio::test]
async fn test_probe_recovers_within_budget() {
    let probe = FlakyProbe {
        attempts: AtomicU32::new(0),
        succeed_after: 3,
    };
    let config = ProberConfig::default()
        .max_attempts(10)
        .retry_delay(Duration::ZERO);

    wait_until_ready(&probe, &config)
        .await
        .expect("fourth attempt should succeed");
    assert_eq!(probe.attempts.load(Ordering::SeqCst), 4);
}
