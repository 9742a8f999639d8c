//! Streaming JSON output.

use super::{CollectionSummary, Sink};
use crate::core::TaggedItem;
use crate::errors::{AzflowError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Value of `meta.type`.
pub const META_TYPE: &str = "azure";

/// Value of `meta.version`.
pub const META_VERSION: u32 = 5;

#[derive(Serialize)]
struct Meta {
    #[serde(rename = "type")]
    kind: &'static str,
    version: u32,
    count: usize,
    run_id: Uuid,
    collected_at: DateTime<Utc>,
}

/// Writes `{"data": [...], "meta": {...}}` incrementally.
///
/// Records are written as they arrive, so memory use does not grow with the
/// size of the tenant. The `meta` object follows the data because it
/// carries the final record count.
#[derive(Debug)]
pub struct JsonSink<W> {
    writer: W,
    run_id: Uuid,
    started: DateTime<Utc>,
    count: usize,
    opened: bool,
}

impl<W> JsonSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W, run_id: Uuid) -> Self {
        Self {
            writer,
            run_id,
            started: Utc::now(),
            count: 0,
            opened: false,
        }
    }

    /// Returns the number of records written.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn open(&mut self) -> Result<()> {
        if !self.opened {
            self.writer.write_all(b"{\"data\":[").await?;
            self.opened = true;
        }
        Ok(())
    }
}

#[async_trait]
impl<W> Sink for JsonSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, item: &TaggedItem) -> Result<()> {
        let record = serde_json::to_vec(item).map_err(|e| AzflowError::Sink(format!("unable to encode record: {e}")))?;
        self.open().await?;
        let separator: &[u8] = if self.count == 0 { b"\n" } else { b",\n" };
        self.writer.write_all(separator).await?;
        self.writer.write_all(&record).await?;
        self.count += 1;
        Ok(())
    }

    async fn finish(&mut self, _summary: &CollectionSummary) -> Result<()> {
        self.open().await?;
        let meta = Meta {
            kind: META_TYPE,
            version: META_VERSION,
            count: self.count,
            run_id: self.run_id,
            collected_at: self.started,
        };
        let meta = serde_json::to_vec(&meta).map_err(|e| AzflowError::Sink(format!("unable to encode meta: {e}")))?;
        self.writer.write_all(b"\n],\"meta\":").await?;
        self.writer.write_all(&meta).await?;
        self.writer.write_all(b"}\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}
