//! `CatalogClient` - popcorn catalog API client implementation.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Client;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::api::LocalCatalogApi;
use super::types::{Payload, SearchParams, Tab};

/// Default base URL for the catalog API.
pub const DEFAULT_BASE_URL: &str = "https://tv-v2.api-fetch.sh/";

/// Catalog API client.
///
/// Holds the shared HTTP connection pool and the base URL. Every request is
/// a single GET with no retry and no caching.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Treat non-2xx responses as errors instead of data.
    error_for_status: bool,
}

/// Builder for `CatalogClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    error_for_status: bool,
}

impl CatalogClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout: None,
            error_for_status: false,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets a whole-request timeout (default: none).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fails on non-2xx responses (default: `false`, error bodies are
    /// returned as data).
    #[must_use]
    pub const fn error_for_status(mut self, enabled: bool) -> Self {
        self.error_for_status = enabled;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<CatalogClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let mut builder = Client::builder().user_agent(&user_agent).gzip(true);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().context("failed to build HTTP client")?;

        Ok(CatalogClient {
            http_client,
            base_url,
            error_for_status: self.error_for_status,
        })
    }
}

impl CatalogClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::new()
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| anyhow!("base URL cannot carry a path: {}", self.base_url))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Sends a GET request with form-encoded query params and decodes the
    /// body as JSON.
    ///
    /// The status code is only checked when `error_for_status` is enabled;
    /// otherwise any JSON body is returned as data.
    #[instrument(skip_all)]
    pub async fn request_json(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value> {
        let path = segments.join("/");
        let url = self
            .endpoint(segments)
            .with_context(|| format!("failed to build URL: {path}"))?;

        let mut request = self.http_client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let request = request
            .build()
            .with_context(|| format!("failed to build request: {path}"))?;

        tracing::debug!(url = %request.url(), "catalog API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if !status.is_success() {
            if self.error_for_status {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<failed to read body>"));
                bail!("catalog API error (HTTP {status}): {body}");
            }
            tracing::debug!(%status, "non-success status passed through as data");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;
        let raw_result: std::result::Result<Value, _> = serde_json::from_str(&body);
        let parsed =
            raw_result.with_context(|| format!("failed to decode JSON response: {path}"))?;
        Ok(parsed)
    }
}

/// Unwraps a JSON array, naming the endpoint on mismatch.
fn into_array(value: Value, path: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => bail!("expected a JSON array from {path}, got {}", json_kind(&other)),
    }
}

/// Short name of a JSON value's kind.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl LocalCatalogApi for CatalogClient {
    #[instrument(skip_all, fields(tab = %tab))]
    async fn pages(&self, tab: Tab) -> Result<usize> {
        let path = tab.collection();
        let value = self.request_json(&[path.as_str()], &[]).await?;
        let pages = into_array(value, &path)?;
        Ok(pages.len())
    }

    #[instrument(skip_all, fields(tab = %tab, page = params.page))]
    async fn search(&self, tab: Tab, params: &SearchParams) -> Result<Vec<Payload>> {
        let collection = tab.collection();
        let page = params.page.to_string();
        let path = format!("{collection}/{page}");
        let value = self
            .request_json(&[collection.as_str(), page.as_str()], &params.to_query())
            .await?;
        let records = into_array(value, &path)?;
        Ok(records.into_iter().map(Payload::list).collect())
    }

    #[instrument(skip_all, fields(tab = %tab))]
    async fn random(&self, tab: Tab) -> Result<Payload> {
        let record = self.request_json(&["random", tab.as_str()], &[]).await?;
        Ok(Payload::list(record))
    }

    #[instrument(skip_all, fields(tab = %tab, id = %id))]
    async fn raw_details(&self, tab: Tab, id: &str) -> Result<Payload> {
        let record = self.request_json(&[tab.as_str(), id], &[]).await?;
        Ok(Payload::detail(record))
    }
}
