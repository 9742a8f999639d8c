use super::{CollectionSummary, Sink};
use crate::core::{EntityKind, TaggedItem};
use crate::errors::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// A sink that keeps every record in memory.
///
/// Clones share the same storage, so a test can keep a handle while the
/// run owns the sink.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    items: Arc<RwLock<Vec<TaggedItem>>>,
    summary: Arc<RwLock<Option<CollectionSummary>>>,
}

impl CollectingSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected records.
    #[must_use]
    pub fn items(&self) -> Vec<TaggedItem> {
        self.items.read().clone()
    }

    /// Returns the collected records of one kind.
    #[must_use]
    pub fn items_of_kind(&self, kind: EntityKind) -> Vec<TaggedItem> {
        self.items.read().iter().filter(|item| item.kind == kind).cloned().collect()
    }

    /// Returns the number of collected records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns the summary passed to `finish`, if it was called.
    #[must_use]
    pub fn summary(&self) -> Option<CollectionSummary> {
        self.summary.read().clone()
    }
}

#[async_trait]
impl Sink for CollectingSink {
    async fn write(&mut self, item: &TaggedItem) -> Result<()> {
        self.items.write().push(item.clone());
        Ok(())
    }

    async fn finish(&mut self, summary: &CollectionSummary) -> Result<()> {
        *self.summary.write() = Some(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, User};

    #[tokio::test]
    async fn test_clones_share_storage() {
        let handle = CollectingSink::new();
        let mut sink = handle.clone();

        sink.write(&TaggedItem::new(User {
            id: "u1".into(),
            ..Default::default()
        }))
        .await
        .unwrap();
        sink.write(&TaggedItem::new(Group {
            id: "g1".into(),
            ..Default::default()
        }))
        .await
        .unwrap();
        assert!(handle.summary().is_none());

        sink.finish(&CollectionSummary::default()).await.unwrap();

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.items_of_kind(EntityKind::User).len(), 1);
        assert!(handle.summary().is_some());
    }
}
