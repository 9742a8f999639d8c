//! Tracking of live stage tasks.

use super::CancellationToken;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, Instrument, Span};

/// Counts the stage tasks of one collection run.
///
/// Handles are not retained: dependent stages spawn one child stream per
/// parent, so keeping a `JoinHandle` per task would grow with the size of
/// the collection. A counter plus a wakeup is enough to await shutdown.
#[derive(Debug, Default)]
pub struct StageTracker {
    active: AtomicUsize,
    spawned: AtomicUsize,
    idle: Notify,
}

/// Decrements the tracker when a stage task ends, including by panic.
struct StageGuard(Arc<StageTracker>);

impl Drop for StageGuard {
    fn drop(&mut self) {
        if self.0.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl StageTracker {
    /// Creates a new tracker.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Spawns a stage task.
    ///
    /// The task runs inside `span`. A panicking stage means the stage wiring
    /// reached a state it cannot interpret; the panic is logged and `token`
    /// is cancelled so the rest of the run winds down.
    pub fn spawn<F>(
        self: &Arc<Self>,
        stage: &str,
        span: Span,
        token: Arc<CancellationToken>,
        task: F,
    ) where
        F: Future<Output = ()> + Send + 'static,
    {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.spawned.fetch_add(1, Ordering::Relaxed);
        let guard = StageGuard(self.clone());
        let stage = stage.to_string();

        tokio::spawn(
            async move {
                let _guard = guard;
                if AssertUnwindSafe(task).catch_unwind().await.is_err() {
                    error!(stage = %stage, "stage aborted, cancelling collection run");
                    token.cancel(format!("stage '{stage}' aborted"));
                }
            }
            .instrument(span),
        );
    }

    /// Returns the number of stage tasks still running.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns the number of stage tasks spawned so far.
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::Relaxed)
    }

    /// Waits until no stage task is running.
    pub async fn join(&self) {
        loop {
            let idle = self.idle.notified();
            if self.active() == 0 {
                return;
            }
            idle.await;
        }
    }
}
