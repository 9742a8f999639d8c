//! Dependent-fetch stage: per-parent listings derived from an upstream stream.

use super::or_done::{send_or_done, OrDone};
use super::stream::{channel, ItemStream};
use crate::context::RunContext;
use crate::errors::AzflowError;
use tracing::{debug, info, warn};

/// An entity that can be named as the parent of derived records.
pub trait Identified {
    /// Returns the id used to attribute derived records and failures.
    fn id(&self) -> &str;
}

/// What a dependent stage does with `Err` items read from its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentErrors {
    /// Drop them; another consumer of the parent stream reports them.
    #[default]
    Skip,
    /// Re-emit them unchanged ahead of any later relation records.
    Forward,
}

/// Lists the dependents of every parent read from `parents`.
///
/// Parents are processed one at a time inside a single task. For each
/// `Ok` parent, `fetch` opens a child stream scoped to it (typically a
/// [`paginate`](super::paginate) listing), and each child is turned into a
/// relation record by `relate` so the consumer can rebuild the edge.
///
/// A failed child listing emits one [`AzflowError::Dependent`] naming the
/// parent, then the stage moves on to the next parent: siblings are
/// independent units of work. `Err` items in `parents` are handled as
/// `parent_errors` says: skipped when another branch of the parent stream
/// reports them, forwarded unchanged when this stage is their only route to
/// the output.
pub fn dependents<P, C, R, F, M>(
    ctx: &RunContext,
    stage: &str,
    parents: ItemStream<P>,
    parent_errors: ParentErrors,
    fetch: F,
    relate: M,
) -> ItemStream<R>
where
    P: Identified + Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    F: Fn(&RunContext, &P) -> ItemStream<C> + Send + 'static,
    M: Fn(&P, C) -> R + Send + 'static,
{
    let (tx, rx) = channel();
    let child_ctx = ctx.clone();
    let token = ctx.token().clone();
    let stage_name = stage.to_string();

    ctx.spawn(stage, async move {
        let mut parents = OrDone::new(parents, token.clone());
        let mut parent_count = 0usize;
        let mut failures = 0usize;

        while let Some(parent) = parents.next().await {
            let parent = match parent {
                Ok(parent) => parent,
                Err(e) => {
                    if parent_errors == ParentErrors::Skip {
                        debug!(error = %e, "skipping failed parent item");
                        continue;
                    }
                    debug!(error = %e, "forwarding failed parent item");
                    if !send_or_done(&tx, Err(e), &token).await {
                        return;
                    }
                    continue;
                }
            };
            parent_count += 1;

            let mut children = OrDone::new(fetch(&child_ctx, &parent), token.clone());
            let mut count = 0usize;
            while let Some(child) = children.next().await {
                let item = match child {
                    Ok(child) => {
                        count += 1;
                        Ok(relate(&parent, child))
                    }
                    Err(source) => {
                        failures += 1;
                        warn!(
                            parent_id = %parent.id(),
                            error = %source,
                            "unable to continue listing dependents for this parent"
                        );
                        Err(AzflowError::Dependent {
                            stage: stage_name.clone(),
                            parent_id: parent.id().to_string(),
                            source,
                        }
                        .shared())
                    }
                };
                if !send_or_done(&tx, item, &token).await {
                    debug!(parents = parent_count, "dependent listing stopped");
                    return;
                }
            }
            debug!(parent_id = %parent.id(), count, "finished listing dependents");
        }

        info!(parents = parent_count, failures, "finished listing all dependents");
    });

    rx
}
