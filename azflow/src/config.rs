//! Collector configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! timeout_secs = 60
//!
//! [retry]
//! max_attempts = 3
//!
//! [queries.AZUser]
//! filter = "accountEnabled eq true"
//! ```

use crate::client::{RetryConfig, GRAPH_ENDPOINT, MANAGEMENT_ENDPOINT};
use crate::collect::QuerySet;
use crate::errors::{AzflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

fn default_graph_endpoint() -> String {
    GRAPH_ENDPOINT.to_string()
}

fn default_management_endpoint() -> String {
    MANAGEMENT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("azflow/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings for a collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Microsoft Graph base URL.
    #[serde(default = "default_graph_endpoint")]
    pub graph_endpoint: String,

    /// Azure Resource Manager base URL.
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,

    /// Tenant the run targets, recorded on the run identity.
    #[serde(default)]
    pub tenant: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Query options per entity kind.
    #[serde(default)]
    pub queries: QuerySet,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            graph_endpoint: default_graph_endpoint(),
            management_endpoint: default_management_endpoint(),
            tenant: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
            queries: QuerySet::default(),
        }
    }
}

impl CollectorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| AzflowError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| AzflowError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Sets the tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the Graph endpoint.
    #[must_use]
    pub fn with_graph_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graph_endpoint = endpoint.into();
        self
    }

    /// Sets the Resource Manager endpoint.
    #[must_use]
    pub fn with_management_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.management_endpoint = endpoint.into();
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the query options.
    #[must_use]
    pub fn with_queries(mut self, queries: QuerySet) -> Self {
        self.queries = queries;
        self
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks endpoint URLs and numeric bounds.
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("graph_endpoint", &self.graph_endpoint),
            ("management_endpoint", &self.management_endpoint),
        ] {
            Url::parse(endpoint).map_err(|e| AzflowError::Config(format!("{name} '{endpoint}': {e}")))?;
        }
        if self.timeout_secs == 0 {
            return Err(AzflowError::Config("timeout_secs must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(AzflowError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(AzflowError::Config(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".into(),
            ));
        }
        Ok(())
    }
}
