//! Stream element and channel conventions shared by every stage.

use crate::errors::SharedError;
use tokio::sync::mpsc;

/// Capacity of every stage's output channel.
///
/// Kept at one so a producer runs at most one item ahead of its consumer;
/// backpressure is the only flow control in the pipeline.
pub const HANDOFF_CAPACITY: usize = 1;

/// The element type of every stream: an entity or the error that ended its branch.
pub type ItemResult<T> = Result<T, SharedError>;

/// A finite, single-consumer stream of results.
///
/// End of stream is signalled by every sender being dropped.
pub type ItemStream<T> = mpsc::Receiver<ItemResult<T>>;

/// Creates a handoff channel with the pipeline's standard capacity.
#[must_use]
pub fn channel<T>() -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(HANDOFF_CAPACITY)
}

/// Builds a closed stream pre-filled with `items`.
///
/// Handy for feeding fixed inputs into stages.
#[must_use]
pub fn from_items<T>(items: Vec<T>) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(items.len().max(1));
    for item in items {
        // Capacity covers every item, so this cannot fail.
        let _ = tx.try_send(item);
    }
    rx
}
