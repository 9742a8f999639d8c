//! Maps the process interrupt signal onto a cancellation token.

use super::CancellationToken;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Cancels `token` when the process receives Ctrl-C.
///
/// The watcher also exits once the token is cancelled for another reason.
pub fn cancel_on_interrupt(token: Arc<CancellationToken>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("interrupt received, cancelling collection");
                    token.cancel("interrupted");
                }
                Err(e) => warn!(error = %e, "unable to listen for interrupt signal"),
            },
            () = token.cancelled() => {}
        }
    })
}
