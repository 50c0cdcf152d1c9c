//! Background flush task for a [`ScoreQueue`].
//!
//! The worker runs a flush pass on a fixed interval and whenever the host
//! reports that connectivity came back via
//! [`FlushWorkerHandle::connectivity_restored`]. Both triggers funnel into
//! [`ScoreQueue::flush`], whose single-flight guard keeps overlapping
//! requests from double-sending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use super::ScoreQueue;

/// Interval between background passes when none is configured.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Builder for the background flush task.
///
/// Call [`spawn`](Self::spawn) to start it.
pub struct FlushWorker {
    queue: Arc<ScoreQueue>,
    interval: Duration,
    cancel: CancellationToken,
}

impl FlushWorker {
    /// Construct a worker (does not start it yet).
    #[must_use]
    pub fn new(queue: Arc<ScoreQueue>, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            queue,
            interval,
            cancel,
        }
    }

    /// Spawn the background task and return a handle for controlling it.
    ///
    /// The first interval tick fires immediately, so entries restored from
    /// storage are retried as soon as the worker starts.
    #[must_use]
    pub fn spawn(self) -> FlushWorkerHandle {
        let connectivity = Arc::new(Notify::new());
        let cancel_for_handle = self.cancel.clone();

        let join_handle = tokio::spawn(
            Self::run(
                self.queue,
                self.interval,
                self.cancel,
                Arc::clone(&connectivity),
            )
            .instrument(info_span!("flush_worker")),
        );

        FlushWorkerHandle {
            connectivity,
            join_handle: Some(join_handle),
            cancel: cancel_for_handle,
        }
    }

    async fn run(
        queue: Arc<ScoreQueue>,
        interval: Duration,
        cancel: CancellationToken,
        connectivity: Arc<Notify>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                () = connectivity.notified() => {
                    info!("connectivity restored, flushing score queue");
                }
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                outcome = queue.flush() => debug!(?outcome, "background flush finished"),
            }
        }

        info!("flush worker shutting down");
    }
}

/// Handle returned from [`FlushWorker::spawn`].
///
/// Dropping the handle cancels the background task.
pub struct FlushWorkerHandle {
    connectivity: Arc<Notify>,
    join_handle: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl FlushWorkerHandle {
    /// Signal that the host went from offline to online; triggers a pass.
    pub fn connectivity_restored(&self) {
        self.connectivity.notify_one();
    }

    /// Stop the background task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FlushWorkerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
