//! Output sinks for collected records.
//!
//! This module provides:
//! - The `Sink` trait
//! - `JsonSink`, a streaming JSON document writer
//! - `CollectingSink` for tests
//! - `output_stream`, which drains a merged stream into a sink

mod collecting;
mod json;
mod output;

pub use collecting::CollectingSink;
pub use json::{JsonSink, META_TYPE, META_VERSION};
pub use output::{output_stream, CollectionSummary};

use crate::core::TaggedItem;
use crate::errors::Result;
use async_trait::async_trait;

/// Receives every successfully collected record, once, in merge order.
#[async_trait]
pub trait Sink: Send {
    /// Writes one record.
    async fn write(&mut self, item: &TaggedItem) -> Result<()>;

    /// Completes the output once the stream has ended.
    async fn finish(&mut self, summary: &CollectionSummary) -> Result<()>;
}
