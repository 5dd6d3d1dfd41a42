//! Sweeper Task
//!
//! Background task that periodically enforces the cache's soft size bound.
//!
//! The task sleeps for the configured prune frequency, then drains: it runs
//! sampler rounds back to back while the store holds more than `max_items`
//! entries, yielding to the runtime between rounds. It stops when its
//! cancellation token fires, either through [`SweeperHandle::shutdown`] or
//! when the handle is dropped.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::CacheInner;
use crate::error::{CacheError, Result};

/// How long `shutdown` waits for the task to finish
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// == Sweeper Handle ==
/// Owner of a running sweeper task. Dropping it cancels the task.
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Returns true until the task has been stopped and has exited.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signals the task to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancels the task and waits (bounded) for it to exit.
    ///
    /// Calling this more than once is a no-op.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.cancel.cancel();

        let Some(task) = self.task.take() else {
            return Ok(());
        };

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
            Ok(Ok(())) => {
                info!("Sweeper stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("Sweeper task failed: {}", e);
                Err(CacheError::SweeperJoin(e.to_string()))
            }
            Err(_) => {
                warn!("Sweeper did not stop within {:?}", SHUTDOWN_TIMEOUT);
                Err(CacheError::ShutdownTimeout(SHUTDOWN_TIMEOUT))
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawns the sweeper for `inner` on `runtime`.
///
/// The first check happens one full `frequency` after spawning.
pub(crate) fn spawn_sweeper<K, V>(
    runtime: &Handle,
    inner: Arc<CacheInner<K, V>>,
    frequency: Duration,
) -> SweeperHandle
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = runtime.spawn(async move {
        info!(
            frequency_ms = frequency.as_millis() as u64,
            max_items = inner.config.get_max_items(),
            sample_width = inner.config.get_sample_width(),
            "Starting sweeper"
        );

        let mut ticker = tokio::time::interval(frequency);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately once; the sweeper starts asleep
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            drain(&inner, &token).await;
        }

        debug!("Sweeper loop exited");
    });

    SweeperHandle {
        cancel,
        task: Some(task),
    }
}

/// Runs sampler rounds until the store is back within bound.
async fn drain<K, V>(inner: &CacheInner<K, V>, token: &CancellationToken)
where
    K: Eq + Hash + Clone,
{
    let mut rounds = 0u64;
    let mut evicted = 0usize;

    while inner.over_bound() && !token.is_cancelled() {
        let removed = inner.prune_round();
        rounds += 1;
        evicted += removed;
        debug!(removed, remaining = inner.store.len(), "Sweep round");
        tokio::task::yield_now().await;
    }

    if rounds > 0 {
        info!(
            rounds,
            evicted,
            remaining = inner.store.len(),
            "Sweep drained cache back within bound"
        );
    } else {
        debug!("Sweep: cache within bound");
    }
}
