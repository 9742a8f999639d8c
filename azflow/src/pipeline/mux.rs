//! Fan-in: many input streams merged into one.

use super::or_done::{send_or_done, OrDone};
use super::stream::channel;
use crate::context::RunContext;
use tokio::sync::mpsc::Receiver;
use tracing::trace;

/// Merges every input into one output stream.
///
/// One reader task per input forwards items to the shared output. Each
/// reader owns a clone of the output sender and the original is dropped
/// before returning, so the output closes exactly once: when the last reader
/// exits. There is no ordering across inputs. On cancellation every reader
/// stops and the output closes.
pub fn mux<T, I>(ctx: &RunContext, inputs: I) -> Receiver<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Receiver<T>>,
{
    let (tx, rx) = channel();

    for (branch, input) in inputs.into_iter().enumerate() {
        let tx = tx.clone();
        let token = ctx.token().clone();
        ctx.spawn("mux", async move {
            let mut input = OrDone::new(input, token.clone());
            let mut items = 0u64;
            while let Some(item) = input.next().await {
                if !send_or_done(&tx, item, &token).await {
                    break;
                }
                items += 1;
            }
            trace!(branch, items, "mux branch finished");
        });
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::from_items;
    use std::time::Duration;

    async fn drain<T>(mut rx: Receiver<T>) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_merges_every_item_exactly_once() {
        let ctx = RunContext::new();
        let lengths = [0usize, 3, 17, 1, 40];
        let inputs: Vec<_> = lengths
            .iter()
            .enumerate()
            .map(|(stream, &len)| from_items((0..len).map(|i| (stream, i)).collect()))
            .collect();

        let mut merged = drain(mux(&ctx, inputs)).await;
        assert_eq!(merged.len(), lengths.iter().sum::<usize>());

        merged.sort_unstable();
        let mut expected: Vec<_> = lengths
            .iter()
            .enumerate()
            .flat_map(|(stream, &len)| (0..len).map(move |i| (stream, i)))
            .collect();
        expected.sort_unstable();
        assert_eq!(merged, expected);
    }

    #[tokio::test]
    async fn test_preserves_order_within_an_input() {
        let ctx = RunContext::new();
        let merged = drain(mux(
            &ctx,
            vec![from_items(vec![("a", 1), ("a", 2), ("a", 3)]), from_items(vec![("b", 1), ("b", 2)])],
        ))
        .await;

        let a: Vec<_> = merged.iter().filter(|(s, _)| *s == "a").map(|(_, i)| *i).collect();
        let b: Vec<_> = merged.iter().filter(|(s, _)| *s == "b").map(|(_, i)| *i).collect();
        assert_eq!(a, vec![1, 2, 3]);
        assert_eq!(b, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_no_inputs_closes_immediately() {
        let ctx = RunContext::new();
        let merged = drain(mux::<u8, _>(&ctx, Vec::new())).await;
        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn test_silent_input_does_not_starve_others() {
        let ctx = RunContext::new();
        let (_silent_tx, silent) = channel::<u8>();
        let mut merged = mux(&ctx, vec![silent, from_items(vec![1, 2])]);

        assert_eq!(merged.recv().await, Some(1));
        assert_eq!(merged.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_cancel_closes_output_with_open_inputs() {
        let ctx = RunContext::new();
        let (_tx1, rx1) = channel::<u8>();
        let (_tx2, rx2) = channel::<u8>();
        let merged = mux(&ctx, vec![rx1, rx2]);

        ctx.cancel("test");
        let items = tokio::time::timeout(Duration::from_secs(1), drain(merged))
            .await
            .expect("output should close after cancel");
        assert!(items.is_empty());
        tokio::time::timeout(Duration::from_secs(1), ctx.join())
            .await
            .expect("readers should exit");
    }
}
