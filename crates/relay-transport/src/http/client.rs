//! `reqwest`-backed fetch and publish.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use serde_json::Value;
use tracing::{debug, trace, warn};

use relay_core::{Fetch, FetchOutcome, FetchRequest, Publish, TransportError, TransportResult};

use super::status::{StatusClass, classify_status};

/// Settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// An HTTP client implementing [`Fetch`] and [`Publish`].
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with default settings.
    pub fn new() -> TransportResult<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Creates a client with the given settings.
    pub fn with_config(config: HttpClientConfig) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| TransportError::Io(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps an existing `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn request_url(request: &FetchRequest) -> Result<Url, String> {
    let parsed = if request.query.is_empty() {
        Url::parse(&request.url)
    } else {
        Url::parse_with_params(&request.url, &request.query)
    };
    parsed.map_err(|e| format!("invalid URL {}: {e}", request.url))
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        let url = match request_url(request) {
            Ok(url) => url,
            Err(reason) => return FetchOutcome::TransientError(reason),
        };

        trace!(url = %request.url, params = request.query.len(), "Fetching document");

        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Fetch failed");
                return FetchOutcome::TransientError(describe(&e));
            }
        };

        let status = resp.status().as_u16();
        match classify_status(status) {
            StatusClass::Success => match resp.json::<Value>().await {
                Ok(doc) => {
                    debug!(url = %request.url, status, "Fetched document");
                    FetchOutcome::Found(doc)
                }
                Err(e) => {
                    warn!(url = %request.url, error = %e, "Response body is not JSON");
                    FetchOutcome::TransientError(format!("undecodable body: {}", describe(&e)))
                }
            },
            StatusClass::NotFound => {
                debug!(url = %request.url, "Provider returned 404");
                FetchOutcome::NotFound
            }
            StatusClass::Failure => {
                warn!(url = %request.url, status, "Provider returned an error status");
                FetchOutcome::TransientError(format!("HTTP {status}"))
            }
        }
    }
}

#[async_trait]
impl Publish for HttpClient {
    async fn post_json(&self, url: &str, body: Value) -> TransportResult<u16> {
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::http(url, describe(&e)))?;

        let status = resp.status().as_u16();
        debug!(url, status, "Posted JSON payload");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_query() {
        let request = FetchRequest::get("http://autocomplete.example.test/aq")
            .query("query", "Portland, OR")
            .query("c", "US");
        let url = request_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://autocomplete.example.test/aq?query=Portland%2C+OR&c=US"
        );
    }

    #[test]
    fn test_request_url_without_query() {
        let request =
            FetchRequest::get("http://api.example.test/key/conditions/q/zmw:97201.1.99999.json");
        let url = request_url(&request).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_request_url_rejects_relative() {
        let err = request_url(&FetchRequest::get("/relative/path")).unwrap_err();
        assert!(err.contains("/relative/path"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transient() {
        let client = HttpClient::from_client(
            Client::builder()
                .no_proxy()
                .timeout(Duration::from_millis(500))
                .build()
                .unwrap(),
        );

        // Nothing listens on the discard port of the loopback interface.
        let outcome = client
            .fetch(&FetchRequest::get("http://127.0.0.1:9/aq"))
            .await;
        assert!(matches!(outcome, FetchOutcome::TransientError(_)));

        let err = client
            .post_json("http://127.0.0.1:9/links", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Http { .. }));
    }
}
