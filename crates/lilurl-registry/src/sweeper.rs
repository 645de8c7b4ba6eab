use crate::controller::AccessController;
use lilurl_generator::Generator;
use lilurl_storage::EntryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to finish.
    pub async fn stop(self) {
        // The task may already be gone; nothing to signal then.
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "sweeper task did not shut down cleanly");
        }
    }
}

/// Spawns a task that evicts expired entries every `every`.
///
/// Lazy eviction on access stays in force; the sweeper only keeps entries
/// nobody asks for from lingering. The first sweep runs one interval after
/// spawning. Dropping the returned handle stops the task as well. Must be
/// called inside a tokio runtime.
pub fn spawn_sweeper<S, G>(controller: Arc<AccessController<S, G>>, every: Duration) -> SweeperHandle
where
    S: EntryStore,
    G: Generator,
{
    let (shutdown, mut shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(every = ?every, "sweeper started");
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    controller.sweep();
                }
            }
        }
        debug!("sweeper stopped");
    });

    SweeperHandle { shutdown, task }
}
