//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired primary-tier entries.
//! The secondary tier is never swept.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::TieredCache;

// == Sweeper Handle ==
/// Controls a running expiry sweeper.
///
/// Dropping the handle also stops the sweeper at its next wake-up.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to exit.
    ///
    /// A sweep cycle already in progress is finished first. The cache lock is
    /// only held per removal, so the cache is never left locked.
    pub async fn stop(self) {
        // The receiver is gone only if the task already exited
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!("Expiry sweeper exited abnormally: {}", e);
            }
        }
    }

    /// Cancels the sweeper at its next await point without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The first sweep happens one interval after spawning. Each cycle calls
/// [`TieredCache::sweep_expired`].
///
/// # Example
/// ```ignore
/// let cache = TieredCache::new(1000, PolicyKind::Lru);
/// let sweeper = spawn_expiry_sweeper(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_expiry_sweeper<K, V>(cache: TieredCache<K, V>, interval: Duration) -> SweeperHandle
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // tokio intervals reject a zero period
    let interval = interval.max(Duration::from_millis(1));
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", interval);

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = cache.sweep_expired().await;
                    if removed > 0 {
                        info!("Expiry sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Expiry sweep: no expired entries found");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    });

    SweeperHandle { shutdown, task }
}
