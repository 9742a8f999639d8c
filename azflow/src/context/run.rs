//! The context threaded through every stage of a collection run.

use super::RunIdentity;
use crate::cancellation::{CancellationToken, StageTracker};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, info_span, Span};

/// Shared handles for one collection run.
///
/// Cloning is cheap; every stage receives a reference at construction time
/// instead of reaching for global state.
#[derive(Debug, Clone)]
pub struct RunContext {
    identity: RunIdentity,
    token: Arc<CancellationToken>,
    tracker: Arc<StageTracker>,
    span: Span,
}

impl RunContext {
    /// Creates a context with a fresh identity and token.
    #[must_use]
    pub fn new() -> Self {
        Self::with_token(RunIdentity::new(), Arc::new(CancellationToken::new()))
    }

    /// Creates a context around an existing token.
    ///
    /// The first cancellation of `token` is logged with its reason.
    #[must_use]
    pub fn with_token(identity: RunIdentity, token: Arc<CancellationToken>) -> Self {
        let span = info_span!("collect", run_id = %identity.run_id);

        let run_id = identity.run_id;
        let weak = Arc::downgrade(&token);
        token.on_cancel(move || {
            let reason = weak.upgrade().and_then(|token| token.reason());
            info!(%run_id, reason = reason.as_deref().unwrap_or("unknown"), "collection run cancelled");
        });

        Self {
            identity,
            token,
            tracker: StageTracker::new(),
            span,
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn token(&self) -> &Arc<CancellationToken> {
        &self.token
    }

    /// Returns the stage tracker.
    #[must_use]
    pub fn tracker(&self) -> &Arc<StageTracker> {
        &self.tracker
    }

    /// Returns the run span.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Returns whether the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels the run.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.token.cancel(reason);
    }

    /// Spawns a stage task inside a `stage` span under the run span.
    pub fn spawn<F>(&self, stage: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let span = info_span!(parent: &self.span, "stage", stage = %stage);
        self.tracker.spawn(stage, span, self.token.clone(), task);
    }

    /// Waits until every stage spawned through this context has exited.
    pub async fn join(&self) {
        self.tracker.join().await;
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
