//! Tempo API client
//!
//! Fetches the day color and current price records, consulting the shared
//! `TtlCache` before touching the network. Bodies are decoded before they are
//! cached, so the cache only ever holds payloads that parsed successfully.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use super::{DayResponse, NowResponse, TempoQuery};
use crate::cache::TtlCache;
use crate::config::Config;

/// Where a body that failed to decode came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrigin {
    Network,
    Cache,
}

impl fmt::Display for ResponseOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseOrigin::Network => f.write_str("network"),
            ResponseOrigin::Cache => f.write_str("cached"),
        }
    }
}

/// Errors that can occur when fetching a Tempo data point
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, including the request timeout
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: StatusCode, url: String },

    /// The body could not be decoded into the expected shape
    #[error("Failed to parse {origin} response for {url}: {source}")]
    Decode {
        url: String,
        origin: ResponseOrigin,
        source: serde_json::Error,
    },
}

impl FetchError {
    /// True for network, timeout and status failures, false for decode errors
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::Decode { .. })
    }
}

/// Whether a fetch may be answered from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Serve fresh cache entries, go to the network otherwise
    #[default]
    Cached,
    /// Always go to the network; successful bodies still refresh the cache
    Bypass,
}

/// Builds the HTTP client shared by all queries
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tempotray/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Client for the Tempo API backed by a shared response cache
#[derive(Debug, Clone)]
pub struct TempoClient {
    /// HTTP client carrying the request timeout
    http_client: Client,
    /// Cache shared with every other fetch path
    cache: Arc<TtlCache>,
    /// API base URL without trailing slash
    base_url: String,
    /// Lifetime of cache entries written by this client
    cache_ttl: Duration,
}

impl TempoClient {
    /// Creates a client from the application configuration
    pub fn new(config: &Config, cache: Arc<TtlCache>) -> Result<Self, FetchError> {
        let http_client = build_http_client(config.timeout)?;
        Ok(Self::with_client(
            http_client,
            config.api_url.clone(),
            config.cache_ttl,
            cache,
        ))
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(
        http_client: Client,
        base_url: impl Into<String>,
        cache_ttl: Duration,
        cache: Arc<TtlCache>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            cache,
            base_url,
            cache_ttl,
        }
    }

    /// The cache this client reads from and writes to
    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// Request URL (and cache identity) for a query
    pub fn url_for(&self, query: TempoQuery) -> String {
        query.url(&self.base_url)
    }

    /// Fetches the day record for `TempoQuery::Today` or `TempoQuery::Tomorrow`
    pub async fn fetch_day(
        &self,
        query: TempoQuery,
        mode: FetchMode,
    ) -> Result<DayResponse, FetchError> {
        self.fetch(query, mode).await
    }

    /// Fetches the current price record
    pub async fn fetch_now(&self, mode: FetchMode) -> Result<NowResponse, FetchError> {
        self.fetch(TempoQuery::CurrentPrice, mode).await
    }

    /// Fetches and decodes a query, going through the cache
    ///
    /// # Behavior
    /// - With `FetchMode::Cached`, a fresh cache entry is decoded and returned.
    ///   A cached body that fails to decode is an error, not a miss.
    /// - Otherwise the request is sent with the client timeout. Transport
    ///   failures and non-success statuses return an error and write nothing.
    /// - A successful body is decoded first and cached only if decoding works.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        query: TempoQuery,
        mode: FetchMode,
    ) -> Result<T, FetchError> {
        let url = self.url_for(query);

        if mode == FetchMode::Cached {
            if let Some(body) = self.cache.get(&url) {
                debug!(%query, %url, "cache hit");
                return decode(&url, &body, ResponseOrigin::Cache);
            }
        }

        debug!(%query, %url, "HTTP request");
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            error!(%url, error = %e, "HTTP request failed");
            FetchError::Request(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, %status, "unexpected HTTP status");
            return Err(FetchError::Status { status, url });
        }

        let body = response.bytes().await?;
        let result = decode(&url, &body, ResponseOrigin::Network)?;

        self.cache.put(url, body.to_vec(), self.cache_ttl);
        Ok(result)
    }
}

fn decode<T: DeserializeOwned>(
    url: &str,
    body: &[u8],
    origin: ResponseOrigin,
) -> Result<T, FetchError> {
    serde_json::from_slice(body).map_err(|source| {
        error!(%url, %origin, error = %source, "failed to parse response");
        FetchError::Decode {
            url: url.to_string(),
            origin,
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TempoColor;

    fn test_client(cache: Arc<TtlCache>) -> TempoClient {
        TempoClient::with_client(
            Client::new(),
            "http://127.0.0.1:9/api/",
            Duration::from_secs(60),
            cache,
        )
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = test_client(Arc::new(TtlCache::new()));
        assert_eq!(
            client.url_for(TempoQuery::Today),
            "http://127.0.0.1:9/api/jourTempo/today"
        );
    }

    #[tokio::test]
    async fn test_fresh_cache_entry_is_served_without_network() {
        let cache = Arc::new(TtlCache::new());
        let client = test_client(Arc::clone(&cache));
        cache.put(
            client.url_for(TempoQuery::Today),
            br#"{"codeJour":2}"#.to_vec(),
            Duration::from_secs(60),
        );

        // Port 9 is not listening; a network attempt would fail
        let day = client
            .fetch_day(TempoQuery::Today, FetchMode::Cached)
            .await
            .expect("cache hit should succeed");
        assert_eq!(day.color(), TempoColor::White);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_a_decode_error() {
        let cache = Arc::new(TtlCache::new());
        let client = test_client(Arc::clone(&cache));
        cache.put(
            client.url_for(TempoQuery::Today),
            b"not json".to_vec(),
            Duration::from_secs(60),
        );

        let result = client.fetch_day(TempoQuery::Today, FetchMode::Cached).await;

        let err = result.expect_err("corrupt cache entry should fail");
        assert!(matches!(
            err,
            FetchError::Decode {
                origin: ResponseOrigin::Cache,
                ..
            }
        ));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_bypass_skips_cache_lookup() {
        let cache = Arc::new(TtlCache::new());
        let client = test_client(Arc::clone(&cache));
        cache.put(
            client.url_for(TempoQuery::CurrentPrice),
            br#"{"tarifKwh":0.2}"#.to_vec(),
            Duration::from_secs(60),
        );

        // Bypass goes to the (unreachable) network instead of the cache
        let result = client.fetch_now(FetchMode::Bypass).await;

        let err = result.expect_err("unreachable network should fail");
        assert!(matches!(err, FetchError::Request(_)));
        assert!(err.is_transient());
    }
}
