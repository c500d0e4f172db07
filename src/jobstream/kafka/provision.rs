//! Idempotent topic provisioning.

use crate::jobstream::kafka::client::TopicAdmin;
use crate::jobstream::kafka::config::{ProvisionerConfig, TopicSpec};
use crate::jobstream::kafka::error::{AdminError, JobStreamError};
use log::{debug, info};

/// Ensures the topic exists with the layout the spec asks for.
///
/// Safe to call repeatedly with the same spec: an already-existing topic is
/// the steady-state success path, not an error. With
/// `spec.reset_on_provision` set, any existing topic is deleted first and
/// its data discarded.
///
/// # Examples
///
/// ```rust,no_run
/// use jobstream::{ensure_topic, KafkaTopicAdmin, ProvisionerConfig, TopicSpec};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let admin = KafkaTopicAdmin::new("localhost:9092")?;
/// let spec = TopicSpec::new("jobs", 3);
/// ensure_topic(&admin, &spec, &ProvisionerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn ensure_topic<A>(
    admin: &A,
    spec: &TopicSpec,
    config: &ProvisionerConfig,
) -> Result<(), JobStreamError>
where
    A: TopicAdmin + Sync + ?Sized,
{
    spec.validate()?;

    if spec.reset_on_provision {
        match admin.delete_topic(&spec.name).await {
            Ok(()) => {
                info!("Deleted existing topic '{}' for a clean start", spec.name);
                // Deletion is asynchronous on the broker; creating too soon
                // races against it.
                tokio::time::sleep(config.delete_settle).await;
            }
            Err(AdminError::NotFound(_)) => {
                debug!("Topic '{}' not present, nothing to delete", spec.name);
            }
            Err(e) => return Err(JobStreamError::Provision(e)),
        }
    }

    match admin.create_topic(spec).await {
        Ok(()) => {
            info!(
                "Created topic '{}' with {} partitions (replication factor {})",
                spec.name, spec.partitions, spec.replication_factor
            );
        }
        Err(AdminError::AlreadyExists(_)) => {
            info!("Topic '{}' already exists", spec.name);
        }
        Err(e) => return Err(JobStreamError::Provision(e)),
    }

    // Let the metadata propagate before publishers and subscribers attach.
    tokio::time::sleep(config.create_settle).await;
    Ok(())
}
