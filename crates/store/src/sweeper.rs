use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::Shared;

/// Handle to the background expiry sweep started by
/// [`SessionStore::spawn_sweeper`](crate::SessionStore::spawn_sweeper).
///
/// The task stops when the handle is dropped, when [`SweeperHandle::shutdown`]
/// is called, or once every store handle is gone.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweep and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!("session sweeper ended abnormally: {e}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub(crate) fn spawn(shared: Weak<Shared>, period: Duration) -> SweeperHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_sweeper(shared, period, shutdown_rx));
    SweeperHandle { shutdown_tx, task }
}

async fn run_sweeper(shared: Weak<Shared>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    if period.is_zero() {
        tracing::info!("Session sweeper disabled (interval=0)");
        return;
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // Skip the first immediate tick
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(shared) = shared.upgrade() else {
                    tracing::debug!("Session store dropped; sweeper exiting");
                    break;
                };
                let removed = shared.sweep();
                if removed > 0 {
                    tracing::debug!(removed, "swept expired sessions");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("Session sweeper shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{SessionStore, StoreConfig};
    use playback_core::testing;
    use std::time::Duration;

    fn store(ttl_secs: u64, sweep_secs: u64) -> SessionStore {
        SessionStore::new(StoreConfig {
            ttl: Duration::from_secs(ttl_secs),
            sweep_interval: Duration::from_secs(sweep_secs),
            ..StoreConfig::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_reclaims_expired_entries_without_reads() {
        let store = store(1, 30);
        let sweeper = store.spawn_sweeper();
        store.put(testing::session(1));
        assert_eq!(store.len(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(store.len(), 0);

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_leaves_live_entries() {
        let store = store(3600, 30);
        let sweeper = store.spawn_sweeper();
        let stored = store.put(testing::session(1));

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(store.len(), 1);
        assert!(store.get(&stored.id).is_some());

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_exits_when_store_is_dropped() {
        let store = store(1, 1);
        let sweeper = store.spawn_sweeper();
        drop(store);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(sweeper.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_disables_sweeper() {
        let store = store(1, 0);
        let sweeper = store.spawn_sweeper();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(sweeper.is_finished());
        sweeper.shutdown().await;
    }
}
