//! Partition-aware batch publishing.

use crate::jobstream::kafka::client::JobSink;
use crate::jobstream::kafka::config::PublisherConfig;
use crate::jobstream::kafka::error::JobStreamError;
use crate::jobstream::kafka::message::Job;
use crate::jobstream::kafka::partitioner::partition_for_key;
use log::{debug, error};

/// Publishes a batch of jobs in order, routing each by its key.
///
/// Each job goes to `partition_for_key(key, partitions)`, followed by the
/// configured pacing delay. The first write failure aborts the rest of the
/// batch and is surfaced as [`JobStreamError::Publish`] carrying the number
/// of jobs already delivered; retrying is the caller's decision. On full
/// success returns the batch size.
///
/// # Examples
///
/// ```rust,no_run
/// use jobstream::{publish_batch, Job, KafkaJobSink, PublisherConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sink = KafkaJobSink::new("localhost:9092")?;
/// let jobs: Vec<Job> = (0..10)
///     .map(|i| Job::new(format!("p1-m{}", i), format!("job-{}", i)))
///     .collect();
///
/// let published = publish_batch(&sink, "jobs", &jobs, &PublisherConfig::new(3)).await?;
/// assert_eq!(published, 10);
/// # Ok(())
/// # }
/// ```
pub async fn publish_batch<S>(
    sink: &S,
    topic: &str,
    jobs: &[Job],
    config: &PublisherConfig,
) -> Result<usize, JobStreamError>
where
    S: JobSink + Sync + ?Sized,
{
    if config.partitions < 1 {
        return Err(JobStreamError::Config(format!(
            "publisher needs at least 1 partition, got {}",
            config.partitions
        )));
    }

    let mut published = 0usize;
    for job in jobs {
        let partition = partition_for_key(&job.key, config.partitions);
        match sink.send(topic, partition, job).await {
            Ok(()) => {
                published += 1;
                debug!(
                    "Published job {}/{} to '{}' partition {}",
                    published,
                    jobs.len(),
                    topic,
                    partition
                );
            }
            Err(source) => {
                error!(
                    "Publish to '{}' aborted after {} of {} jobs: {}",
                    topic,
                    published,
                    jobs.len(),
                    source
                );
                return Err(JobStreamError::Publish { published, source });
            }
        }

        if !config.inter_message_delay.is_zero() {
            tokio::time::sleep(config.inter_message_delay).await;
        }
    }

    Ok(published)
}
