//! # Azflow
//!
//! A streaming collector for Entra ID and Azure Resource Manager objects.
//!
//! Azflow lists directory and resource objects through a graph of
//! concurrent stages connected by bounded channels:
//!
//! - **Paginated listings**: every entity type is read page by page, one
//!   stage per listing, and emitted item by item
//! - **Dependent listings**: owners, members and assignments are listed per
//!   parent from a copy of the parent stream
//! - **Tee and mux**: streams with several consumers are split; every output
//!   is tagged with its kind and merged into one stream
//! - **Cancellation**: one token per run; every stage stops promptly once
//!   it fires
//! - **Partial failure**: a failed listing ends only its own branch and is
//!   reported alongside the records that did arrive
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use azflow::prelude::*;
//! use std::sync::Arc;
//!
//! let config = CollectorConfig::new();
//! let tokens = Arc::new(StaticToken::new(jwt)?);
//! let client = AzureClient::from_config(&config, tokens)?;
//!
//! let ctx = RunContext::new();
//! let stream = collect(&ctx, &client, &CollectionPlan::azure_ad(), &config.queries);
//! let mut sink = JsonSink::new(tokio::io::stdout(), ctx.identity().run_id);
//! let summary = output_stream(&ctx, stream, &mut sink).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod client;
pub mod collect;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod sink;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::{cancel_on_interrupt, CancellationToken, StageTracker};
    #[cfg(feature = "http")]
    pub use crate::client::{HttpRestClient, StaticToken, TokenSource};
    pub use crate::client::{AzureClient, QueryParams, RestClient, RetryConfig};
    pub use crate::collect::{collect, CollectionPlan, QuerySet};
    pub use crate::config::CollectorConfig;
    pub use crate::context::{RunContext, RunIdentity};
    pub use crate::core::{Entity, EntityKind, TaggedItem};
    pub use crate::errors::{AzflowError, Result, SharedError};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::pipeline::{
        dependents, filter_map, mux, paginate, tag, tee, tee_n, ItemResult, ItemStream, OrDone, Page,
        PageSource, ParentErrors,
    };
    pub use crate::sink::{output_stream, CollectingSink, CollectionSummary, JsonSink, Sink};
}
