//! Pure per-item stages: filtering, re-tagging and wrapping for the merge point.

use super::dependents::ParentErrors;
use super::or_done::{send_or_done, OrDone};
use super::stream::{channel, ItemStream};
use crate::context::RunContext;
use crate::core::{Entity, TaggedItem};
use tracing::debug;

/// Maps every `Ok` item through `f`, dropping the ones it rejects.
///
/// `Err` items are forwarded unchanged so failures stay visible downstream.
/// The function only decides what this stage re-emits; it cannot affect
/// other consumers of the same items.
pub fn filter_map<T, U, F>(ctx: &RunContext, stage: &str, input: ItemStream<T>, f: F) -> ItemStream<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> Option<U> + Send + 'static,
{
    filter_map_with(ctx, stage, input, ParentErrors::Forward, f)
}

/// Like [`filter_map`], with `Err` items dropped under [`ParentErrors::Skip`].
///
/// Used on a tee branch whose sibling already reports the errors.
pub fn filter_map_with<T, U, F>(
    ctx: &RunContext,
    stage: &str,
    input: ItemStream<T>,
    errors: ParentErrors,
    mut f: F,
) -> ItemStream<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> Option<U> + Send + 'static,
{
    let (tx, rx) = channel();
    let token = ctx.token().clone();

    ctx.spawn(stage, async move {
        let mut input = OrDone::new(input, token.clone());
        let (mut kept, mut skipped) = (0u64, 0u64);

        while let Some(item) = input.next().await {
            let out = match item {
                Ok(value) => match f(value) {
                    Some(mapped) => {
                        kept += 1;
                        Ok(mapped)
                    }
                    None => {
                        skipped += 1;
                        continue;
                    }
                },
                Err(_) if errors == ParentErrors::Skip => continue,
                Err(e) => Err(e),
            };
            if !send_or_done(&tx, out, &token).await {
                break;
            }
        }

        debug!(kept, skipped, "filter finished");
    });

    rx
}

/// Wraps a typed stream into tagged items for the merge point.
pub fn tag<T>(ctx: &RunContext, input: ItemStream<T>) -> ItemStream<TaggedItem>
where
    T: Into<Entity> + Send + 'static,
{
    filter_map(ctx, "tag", input, |item| Some(TaggedItem::new(item.into())))
}
