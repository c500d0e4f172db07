//! Error taxonomy for the job-distribution layer.
//!
//! Broker errors are classified once, at the client boundary, by matching
//! `RDKafkaErrorCode` values. The subscriber loop only ever sees the
//! classified [`PollError`] kinds and never re-inspects error text.

use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::error::Error;
use std::fmt;

/// Top-level error type for provisioning, probing, and publishing.
///
/// Only `Connectivity` (at startup) and `Provision` are meant to stop a
/// process; `Publish` is returned to the caller with the count of jobs
/// already delivered so retry policy stays the caller's decision.
#[derive(Debug)]
pub enum JobStreamError {
    /// Broker unreachable for the entire probe attempt budget.
    Connectivity { attempts: u32 },
    /// Topic provisioning failed for a reason other than "already exists".
    Provision(AdminError),
    /// A batch publish aborted partway through.
    Publish { published: usize, source: KafkaError },
    /// Invalid configuration supplied by the caller.
    Config(String),
    /// Client construction or other broker-level failure.
    Kafka(KafkaError),
}

impl fmt::Display for JobStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStreamError::Connectivity { attempts } => {
                write!(f, "Broker not reachable after {} attempts", attempts)
            }
            JobStreamError::Provision(e) => write!(f, "Topic provisioning failed: {}", e),
            JobStreamError::Publish { published, source } => {
                write!(f, "Publish aborted after {} jobs: {}", published, source)
            }
            JobStreamError::Config(msg) => write!(f, "Configuration error: {}", msg),
            JobStreamError::Kafka(e) => write!(f, "Kafka error: {}", e),
        }
    }
}

impl Error for JobStreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JobStreamError::Provision(e) => Some(e),
            JobStreamError::Publish { source, .. } => Some(source),
            JobStreamError::Kafka(e) => Some(e),
            JobStreamError::Connectivity { .. } | JobStreamError::Config(_) => None,
        }
    }
}

impl From<KafkaError> for JobStreamError {
    fn from(err: KafkaError) -> Self {
        JobStreamError::Kafka(err)
    }
}

impl From<AdminError> for JobStreamError {
    fn from(err: AdminError) -> Self {
        JobStreamError::Provision(err)
    }
}

/// Outcome of a topic admin request, with the per-topic broker responses
/// already mapped to structured variants.
#[derive(Debug)]
pub enum AdminError {
    /// The topic is already present on the broker.
    AlreadyExists(String),
    /// The topic is not present on the broker.
    NotFound(String),
    /// The admin request failed before the broker reported a per-topic result.
    Kafka(KafkaError),
    /// The broker rejected the request for this topic.
    Rejected {
        topic: String,
        code: RDKafkaErrorCode,
    },
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::AlreadyExists(topic) => write!(f, "Topic '{}' already exists", topic),
            AdminError::NotFound(topic) => write!(f, "Topic '{}' does not exist", topic),
            AdminError::Kafka(e) => write!(f, "Admin request failed: {}", e),
            AdminError::Rejected { topic, code } => {
                write!(f, "Broker rejected request for topic '{}': {}", topic, code)
            }
        }
    }
}

impl Error for AdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AdminError::Kafka(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KafkaError> for AdminError {
    fn from(err: KafkaError) -> Self {
        AdminError::Kafka(err)
    }
}

/// Classified outcome of a failed poll, produced once at the client boundary.
///
/// The subscriber applies a distinct recovery policy per variant; none of
/// these ever terminates the consumption loop.
#[derive(Debug)]
pub enum PollError {
    /// No message arrived within the poll window, or the broker was
    /// unreachable for the duration of it. Recovered with a short fixed
    /// delay; does not grow the backoff.
    Idle,
    /// The group coordinator is not ready yet (broker still initializing).
    /// Same recovery as `Idle`, distinct diagnostic.
    CoordinatorNotReady,
    /// Any other broker failure; drives the capped exponential backoff.
    Broker(KafkaError),
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Idle => write!(f, "No message within the poll window"),
            PollError::CoordinatorNotReady => write!(f, "Group coordinator not yet available"),
            PollError::Broker(e) => write!(f, "Broker error: {}", e),
        }
    }
}

impl Error for PollError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PollError::Broker(e) => Some(e),
            _ => None,
        }
    }
}

/// Maps a consumer-side Kafka error into its recovery class.
pub fn classify_consumer_error(err: KafkaError) -> PollError {
    match err.rdkafka_error_code() {
        Some(code) if is_coordinator_code(code) => PollError::CoordinatorNotReady,
        Some(code) if is_connectivity_code(code) => PollError::Idle,
        _ => PollError::Broker(err),
    }
}

fn is_coordinator_code(code: RDKafkaErrorCode) -> bool {
    matches!(
        code,
        RDKafkaErrorCode::CoordinatorNotAvailable
            | RDKafkaErrorCode::NotCoordinator
            | RDKafkaErrorCode::CoordinatorLoadInProgress
    )
}

fn is_connectivity_code(code: RDKafkaErrorCode) -> bool {
    matches!(
        code,
        RDKafkaErrorCode::BrokerTransportFailure
            | RDKafkaErrorCode::AllBrokersDown
            | RDKafkaErrorCode::OperationTimedOut
            | RDKafkaErrorCode::RequestTimedOut
            | RDKafkaErrorCode::NetworkException
    )
}
