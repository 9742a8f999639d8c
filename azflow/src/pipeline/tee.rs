//! Fan-out: one input stream copied to several outputs.

use super::or_done::{deliver, Delivery, OrDone};
use super::stream::channel;
use crate::context::RunContext;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::debug;

/// Splits `input` into `N` streams that each see every item.
///
/// See [`tee_n`] for the delivery rules.
pub fn tee<T, const N: usize>(ctx: &RunContext, input: Receiver<T>) -> [Receiver<T>; N]
where
    T: Clone + Send + 'static,
{
    let mut senders = Vec::with_capacity(N);
    let outputs = std::array::from_fn(|_| {
        let (tx, rx) = channel();
        senders.push(tx);
        rx
    });
    spawn_tee(ctx, input, senders);
    outputs
}

/// Splits `input` into `k` streams that each see every item.
///
/// An item is offered to every output, in output order, before the next
/// input item is read, so the slowest branch gates progress. When the input
/// ends all outputs close. When the run is cancelled the tee stops at once
/// and closes all outputs; an item that was mid-delivery may have reached
/// only some branches, which is acceptable because cancelled results are
/// discarded anyway. A branch whose receiver is dropped is skipped from then
/// on. `k == 0` drops the input.
pub fn tee_n<T>(ctx: &RunContext, input: Receiver<T>, k: usize) -> Vec<Receiver<T>>
where
    T: Clone + Send + 'static,
{
    let (senders, outputs): (Vec<_>, Vec<_>) = (0..k).map(|_| channel()).unzip();
    spawn_tee(ctx, input, senders);
    outputs
}

fn spawn_tee<T>(ctx: &RunContext, input: Receiver<T>, senders: Vec<Sender<T>>)
where
    T: Clone + Send + 'static,
{
    if senders.is_empty() {
        debug!("tee without outputs, dropping input");
        return;
    }

    let token = ctx.token().clone();
    ctx.spawn("tee", async move {
        let branches = senders.len();
        let mut outputs: Vec<Option<Sender<T>>> = senders.into_iter().map(Some).collect();
        let mut input = OrDone::new(input, token.clone());
        let mut items = 0u64;

        'items: while let Some(item) = input.next().await {
            items += 1;
            for slot in &mut outputs {
                let Some(tx) = slot.as_ref() else { continue };
                match deliver(tx, item.clone(), &token).await {
                    Delivery::Sent => {}
                    Delivery::Closed => *slot = None,
                    Delivery::Cancelled => break 'items,
                }
            }
            if outputs.iter().all(Option::is_none) {
                debug!("every tee branch was dropped");
                break;
            }
        }

        debug!(items, branches, cancelled = token.is_cancelled(), "tee finished");
    });
}
