//! Cancellation fan-out for subscriber workers.

use log::debug;
use tokio::sync::broadcast;

/// Broadcasts a stop signal to every subscribed worker.
///
/// Workers observe the signal once per loop iteration and inside every
/// sleep, so cancellation does not wait out an in-flight backoff. Dropping
/// the last coordinator clone also stops subscribed workers (the closed
/// channel is treated as a stop signal).
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// A receiver for one worker.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Signals every subscribed worker to stop.
    pub fn trigger(&self) {
        if self.sender.send(()).is_err() {
            debug!("Shutdown triggered with no workers subscribed");
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
