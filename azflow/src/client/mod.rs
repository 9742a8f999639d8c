//! Clients for Microsoft Graph and Azure Resource Manager.
//!
//! This module provides:
//! - The `RestClient` transport seam and its reqwest implementation
//! - OData query parameters and the consistency-level rule
//! - `AzureClient`, the typed listing operations

mod azure;
mod decode;
#[cfg(feature = "http")]
mod http;
mod query;
mod rest;
mod retry;

pub use azure::AzureClient;
pub use decode::decode;
#[cfg(feature = "http")]
pub use http::{HttpRestClient, StaticToken, TokenSource};
pub use query::{QueryParams, GRAPH_PAGE_SIZE};
#[cfg(test)]
pub use rest::MockRestClient;
pub use rest::{PreparedRequest, RestClient, StringMap, GRAPH_ENDPOINT, MANAGEMENT_ENDPOINT};
pub use retry::{BackoffStrategy, JitterStrategy, RetryConfig};
