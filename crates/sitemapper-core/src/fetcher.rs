use crate::config::FetchConfig;
use crate::sitemap::decode_body;
use crate::{Error, Result};
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument};

/// HTTP client for fetching sitemap documents with a bounded per-request timeout
#[derive(Debug, Clone)]
pub struct SitemapFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl SitemapFetcher {
    /// Creates a fetcher with the default fetch settings
    pub fn new() -> Result<Self> {
        Self::with_config(&FetchConfig::default())
    }

    /// Creates a fetcher from explicit fetch settings
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Fetches a sitemap and returns its body as text.
    ///
    /// Transport errors, non-2xx statuses, empty bodies and bodies larger than
    /// `max_body_bytes` (raw or gunzipped) are reported as [`Error::FetchFailed`];
    /// undecodable bodies as [`Error::Parse`].
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, "application/xml, text/xml;q=0.9, */*;q=0.8")
            .send()
            .await
            .map_err(|e| fetch_failed(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let limit = self.max_body_bytes;
        let limit_u64 = u64::try_from(limit).unwrap_or(u64::MAX);
        if response.content_length().is_some_and(|len| len > limit_u64) {
            return Err(body_too_large(url, limit));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| fetch_failed(url, &e))? {
            if bytes.len() + chunk.len() > limit {
                return Err(body_too_large(url, limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(Error::FetchFailed {
                url: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        decode_body(&bytes, limit).map_err(|err| match err {
            Error::LimitExceeded { reason, .. } => Error::FetchFailed {
                url: url.to_string(),
                reason,
            },
            other => other,
        })
    }
}

fn body_too_large(url: &str, limit: usize) -> Error {
    Error::FetchFailed {
        url: url.to_string(),
        reason: format!("response body exceeds {limit} bytes"),
    }
}

fn fetch_failed(url: &str, err: &reqwest::Error) -> Error {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    Error::FetchFailed {
        url: url.to_string(),
        reason,
    }
}
