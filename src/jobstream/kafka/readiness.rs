//! Broker readiness probing.

use crate::jobstream::kafka::client::BrokerProbe;
use crate::jobstream::kafka::config::ProberConfig;
use crate::jobstream::kafka::error::JobStreamError;
use log::{info, warn};

/// Polls broker connectivity until reachable or the attempt budget runs out.
///
/// Exhausting the budget returns [`JobStreamError::Connectivity`], which
/// callers should treat as fatal: nothing downstream can work without a
/// broker.
///
/// # Examples
///
/// ```rust,no_run
/// use jobstream::{wait_until_ready, KafkaProbe, ProberConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let probe = KafkaProbe::new("localhost:9092")?;
/// wait_until_ready(&probe, &ProberConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn wait_until_ready<P>(probe: &P, config: &ProberConfig) -> Result<(), JobStreamError>
where
    P: BrokerProbe + Sync + ?Sized,
{
    for attempt in 1..=config.max_attempts {
        match probe.probe().await {
            Ok(()) => {
                info!("Broker reachable (attempt {}/{})", attempt, config.max_attempts);
                return Ok(());
            }
            Err(e) => {
                warn!(
                    "Waiting for broker to be ready (attempt {}/{}): {}",
                    attempt, config.max_attempts, e
                );
                if attempt < config.max_attempts {
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }

    Err(JobStreamError::Connectivity {
        attempts: config.max_attempts,
    })
}
