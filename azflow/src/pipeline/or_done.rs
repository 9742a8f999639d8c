//! Cancellation-aware channel receive and send.

use crate::cancellation::CancellationToken;
use futures::Stream;
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender};

/// Reads a channel until it closes or the run is cancelled.
///
/// Every call to [`next`](Self::next) either yields the next upstream item
/// or observes cancellation. Once the token has fired it never waits on the
/// producer again, so a stage never deadlocks behind a blocked upstream.
#[derive(Debug)]
pub struct OrDone<T> {
    rx: Receiver<T>,
    token: Arc<CancellationToken>,
}

impl<T> OrDone<T> {
    /// Wraps `rx` so reads also watch `token`.
    #[must_use]
    pub fn new(rx: Receiver<T>, token: Arc<CancellationToken>) -> Self {
        Self { rx, token }
    }

    /// Returns the next item, or `None` on end of stream or cancellation.
    pub async fn next(&mut self) -> Option<T> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            item = self.rx.recv() => item,
        }
    }

    /// Converts into a [`futures::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures::stream::unfold(self, |mut or_done| async move {
            or_done.next().await.map(|item| (item, or_done))
        })
    }
}

/// Outcome of a cancellation-aware send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The consumer accepted the item.
    Sent,
    /// The consumer dropped its receiver.
    Closed,
    /// The run was cancelled before the consumer was ready.
    Cancelled,
}

/// Sends `item`, giving up as soon as the run is cancelled.
pub async fn deliver<T>(tx: &Sender<T>, item: T, token: &CancellationToken) -> Delivery {
    tokio::select! {
        biased;
        () = token.cancelled() => Delivery::Cancelled,
        sent = tx.send(item) => match sent {
            Ok(()) => Delivery::Sent,
            Err(_) => Delivery::Closed,
        },
    }
}

/// Sends `item`; returns `false` when the producer should stop.
pub async fn send_or_done<T>(tx: &Sender<T>, item: T, token: &CancellationToken) -> bool {
    deliver(tx, item, token).await == Delivery::Sent
}
