//! reqwest-backed [`RestClient`] for Graph and Resource Manager.

use super::rest::{PreparedRequest, RestClient, StringMap};
use super::retry::RetryConfig;
use crate::errors::{AzflowError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Supplies bearer tokens for outgoing requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a token valid for the next request.
    async fn token(&self) -> Result<String>;
}

/// A pre-acquired bearer token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps a raw JWT. Rejects empty tokens.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim().to_string();
        if token.is_empty() {
            return Err(AzflowError::Auth("empty bearer token".into()));
        }
        Ok(Self(token))
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// OData error response, shared by Graph and Resource Manager.
#[derive(Debug, Deserialize)]
struct ODataError {
    error: ODataErrorBody,
}

#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// HTTP transport for one API endpoint.
#[derive(Clone)]
pub struct HttpRestClient {
    http: reqwest::Client,
    base: Url,
    tokens: Arc<dyn TokenSource>,
    retry: RetryConfig,
}

impl std::fmt::Debug for HttpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRestClient")
            .field("base", &self.base.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpRestClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http,
            base: Url::parse(base_url)?,
            tokens,
            retry: RetryConfig::default(),
        })
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the endpoint base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, path: &str, params: &StringMap) -> Result<Url> {
        let mut url = self.base.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(url)
    }

    /// Performs a GET, retrying transient failures.
    async fn execute(&self, url: Url, headers: &StringMap) -> Result<Vec<u8>> {
        let mut attempt = 0usize;

        loop {
            let token = self.tokens.token().await?;
            let mut request = self.http.get(url.clone()).bearer_auth(token);
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }

            let (err, retry_after) = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(%url, status = status.as_u16(), "request succeeded");
                        return Ok(response.bytes().await?.to_vec());
                    }
                    let retry_after = retry_after_seconds(response.headers());
                    let body = response.bytes().await.unwrap_or_default();
                    (api_error(status, &body), retry_after)
                }
                Err(e) => (AzflowError::from(e), None),
            };

            if !err.is_transient() || !self.retry.can_retry(attempt) {
                return Err(err);
            }

            let delay = retry_after.map_or_else(|| self.retry.delay(attempt), |s| self.retry.retry_after(s));
            warn!(
                %url,
                error = %err,
                attempt = attempt + 1,
                max_attempts = self.retry.max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    #[instrument(skip(self, params, headers))]
    async fn get(&self, path: &str, params: &StringMap, headers: &StringMap) -> Result<Vec<u8>> {
        let url = self.url_for(path, params)?;
        self.execute(url, headers).await
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn send(&self, request: PreparedRequest) -> Result<Vec<u8>> {
        self.execute(request.url, &request.headers).await
    }
}

fn retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn api_error(status: reqwest::StatusCode, body: &[u8]) -> AzflowError {
    if let Ok(odata) = serde_json::from_slice::<ODataError>(body) {
        return AzflowError::Api {
            status: status.as_u16(),
            code: odata.error.code,
            message: odata.error.message,
        };
    }

    AzflowError::Api {
        status: status.as_u16(),
        code: status.canonical_reason().unwrap_or("Unknown").to_string(),
        message: String::from_utf8_lossy(body).into_owned(),
    }
}
