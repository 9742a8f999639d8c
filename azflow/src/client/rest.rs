//! The REST transport seam.

use crate::errors::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use url::Url;

/// Microsoft Graph endpoint for the public cloud.
pub const GRAPH_ENDPOINT: &str = "https://graph.microsoft.com";

/// Resource Manager endpoint for the public cloud.
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Query parameters or headers, in a stable order.
pub type StringMap = BTreeMap<String, String>;

/// A fully formed GET request, used to follow continuation links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Absolute request URL, query included.
    pub url: Url,
    /// Extra request headers.
    pub headers: StringMap,
}

impl PreparedRequest {
    /// Prepares a GET for an absolute link.
    pub fn get(link: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(link)?,
            headers: StringMap::new(),
        })
    }
}

/// A REST endpoint returning raw response bodies.
///
/// Implementations own authentication and transient-failure retries. A
/// request is cancelled by dropping its future.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestClient: Send + Sync {
    /// GETs `path` relative to the endpoint base with the given query and headers.
    async fn get(&self, path: &str, params: &StringMap, headers: &StringMap) -> Result<Vec<u8>>;

    /// Sends a prepared request as-is.
    async fn send(&self, request: PreparedRequest) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepared_request_keeps_query() {
        let request = PreparedRequest::get("https://graph.microsoft.com/v1.0/users?$skiptoken=abc").unwrap();
        assert_eq!(request.url.path(), "/v1.0/users");
        assert_eq!(request.url.query(), Some("$skiptoken=abc"));
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_prepared_request_rejects_relative_link() {
        assert!(PreparedRequest::get("/v1.0/users").is_err());
    }
}
