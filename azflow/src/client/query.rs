//! OData query parameters.

use super::rest::StringMap;
use serde::{Deserialize, Serialize};

/// Page size requested from Graph listings.
pub const GRAPH_PAGE_SIZE: u32 = 999;

/// Query options for a listing call.
///
/// Empty strings and `None` mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// `$filter`
    pub filter: String,
    /// `$search`
    pub search: String,
    /// `$orderby`
    pub order_by: String,
    /// `$select`
    pub select: Vec<String>,
    /// `$expand`
    pub expand: String,
    /// `$top`
    pub top: Option<u32>,
    /// `$count`
    pub count: bool,
    /// `api-version`, for Resource Manager calls.
    pub api_version: String,
}

impl QueryParams {
    /// Creates empty params.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `$filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets `$search`.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sets `$orderby`.
    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// Sets `$select`.
    #[must_use]
    pub fn with_select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets `$expand`.
    #[must_use]
    pub fn with_expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = expand.into();
        self
    }

    /// Sets `$top`.
    #[must_use]
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Sets `$count`.
    #[must_use]
    pub fn with_count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    /// Sets `api-version`.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Returns the query string parameters that are set.
    #[must_use]
    pub fn as_map(&self) -> StringMap {
        let mut map = StringMap::new();
        let mut put = |key: &str, value: &str| {
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        };

        put("$filter", &self.filter);
        put("$search", &self.search);
        put("$orderby", &self.order_by);
        put("$select", &self.select.join(","));
        put("$expand", &self.expand);
        put("api-version", &self.api_version);
        if let Some(top) = self.top {
            map.insert("$top".to_string(), top.to_string());
        }
        if self.count {
            map.insert("$count".to_string(), "true".to_string());
        }
        map
    }

    /// Returns true when Graph requires eventual consistency for this query.
    ///
    /// Advanced queries (counting, searching, filtering combined with
    /// ordering, or `endsWith` filters) are only served from the eventually
    /// consistent index.
    #[must_use]
    pub fn needs_eventual_consistency(&self) -> bool {
        self.count
            || !self.search.is_empty()
            || (!self.filter.is_empty() && !self.order_by.is_empty())
            || self.filter.contains("endsWith")
    }

    /// Returns the headers this query requires.
    #[must_use]
    pub fn headers(&self) -> StringMap {
        let mut headers = StringMap::new();
        if self.needs_eventual_consistency() {
            headers.insert("ConsistencyLevel".to_string(), "eventual".to_string());
        }
        headers
    }
}
