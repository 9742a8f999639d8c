//! Draining the merged stream into a sink.

use super::Sink;
use crate::context::RunContext;
use crate::core::{EntityKind, TaggedItem};
use crate::errors::Result;
use crate::pipeline::{ItemStream, OrDone};
use futures::StreamExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What a finished run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    /// Run id.
    pub run_id: Uuid,
    /// Records written per kind.
    pub counts: BTreeMap<EntityKind, usize>,
    /// Error items seen on the stream.
    pub errors: usize,
    /// Whether the run was cancelled before the stream ended.
    pub cancelled: bool,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl CollectionSummary {
    /// Total records written.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Returns true if every listing completed without error.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors == 0 && !self.cancelled
    }
}

/// Writes every `Ok` record of `stream` to `sink` and logs every error.
///
/// Reads through [`OrDone`], so a cancelled run stops promptly; the sink is
/// still finished so its output stays well formed. A sink failure cancels
/// the run and is returned.
pub async fn output_stream<S>(ctx: &RunContext, stream: ItemStream<TaggedItem>, sink: &mut S) -> Result<CollectionSummary>
where
    S: Sink + ?Sized,
{
    let started = Instant::now();
    let mut summary = CollectionSummary {
        run_id: ctx.identity().run_id,
        ..CollectionSummary::default()
    };

    let items = OrDone::new(stream, ctx.token().clone()).into_stream();
    futures::pin_mut!(items);

    while let Some(item) = items.next().await {
        match item {
            Ok(item) => {
                if let Err(e) = sink.write(&item).await {
                    error!(error = %e, "unable to write record, cancelling run");
                    ctx.cancel(format!("sink failed: {e}"));
                    return Err(e);
                }
                *summary.counts.entry(item.kind).or_default() += 1;
            }
            Err(e) => {
                summary.errors += 1;
                match e.parent_id() {
                    Some(parent_id) => warn!(error = %e, parent_id, "collection error"),
                    None => warn!(error = %e, "collection error"),
                }
            }
        }
    }

    summary.cancelled = ctx.is_cancelled();
    summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    sink.finish(&summary).await?;

    for (kind, count) in &summary.counts {
        debug!(%kind, count, "records written");
    }
    info!(
        records = summary.total(),
        errors = summary.errors,
        cancelled = summary.cancelled,
        duration_ms = summary.duration_ms,
        "collection completed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AzflowError;
    use crate::models::{Group, User};
    use crate::pipeline::{channel, from_items};
    use crate::sink::CollectingSink;
    use async_trait::async_trait;
    use std::time::Duration;

    fn user(id: &str) -> TaggedItem {
        TaggedItem::new(User {
            id: id.into(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_writes_ok_items_and_counts_errors() {
        let ctx = RunContext::new();
        let stream = from_items(vec![
            Ok(user("u1")),
            Err(AzflowError::Dependent {
                stage: "group_members".into(),
                parent_id: "g2".into(),
                source: AzflowError::Config("x".into()).shared(),
            }
            .shared()),
            Ok(TaggedItem::new(Group {
                id: "g1".into(),
                ..Default::default()
            })),
            Ok(user("u2")),
        ]);
        let mut sink = CollectingSink::new();

        let summary = output_stream(&ctx, stream, &mut sink).await.unwrap();

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.items_of_kind(EntityKind::User).len(), 2);
        assert_eq!(summary.counts[&EntityKind::User], 2);
        assert_eq!(summary.counts[&EntityKind::Group], 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_complete());
        assert_eq!(sink.summary(), Some(summary));
    }

    #[tokio::test]
    async fn test_cancel_finishes_sink() {
        let ctx = RunContext::new();
        let (_tx, rx) = channel::<crate::pipeline::ItemResult<TaggedItem>>();
        let mut sink = CollectingSink::new();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel("interrupted");
        });

        let summary = tokio::time::timeout(Duration::from_secs(1), output_stream(&ctx, rx, &mut sink))
            .await
            .expect("output should stop on cancel")
            .unwrap();
        assert!(summary.cancelled);
        assert!(sink.summary().is_some());
    }

    #[tokio::test]
    async fn test_sink_failure_cancels_run() {
        struct Broken;

        #[async_trait]
        impl Sink for Broken {
            async fn write(&mut self, _item: &TaggedItem) -> Result<()> {
                Err(AzflowError::Sink("disk full".into()))
            }

            async fn finish(&mut self, _summary: &CollectionSummary) -> Result<()> {
                Ok(())
            }
        }

        let ctx = RunContext::new();
        let err = output_stream(&ctx, from_items(vec![Ok(user("u1"))]), &mut Broken)
            .await
            .unwrap_err();
        assert!(matches!(err, AzflowError::Sink(_)));
        assert!(ctx.is_cancelled());
    }
}
