//! Recursive sitemap URL extraction.
//!
//! [`SitemapExtractor`] fetches a root sitemap and, when it is a sitemap index,
//! walks every nested sitemap it references. Page URLs from every `<urlset>`
//! reached are merged, deduplicated (first-seen order) and returned.
//!
//! ## Failure policy
//!
//! - The root sitemap must be reachable and parse as XML, otherwise the call
//!   fails with [`Error::FetchFailed`].
//! - A nested sitemap that cannot be fetched or parsed only abandons its own
//!   branch. The failure is logged and recorded in [`ExtractReport::skipped`].
//! - A walk that reaches no page URLs fails with [`Error::NoUrlsFound`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use sitemapper_core::extract::SitemapExtractor;
//!
//! # async fn example() -> sitemapper_core::Result<()> {
//! let extractor = SitemapExtractor::new()?;
//! let report = extractor.extract("https://example.com/sitemap.xml").await?;
//! println!("{} URLs from {} sitemaps", report.urls.len(), report.sitemaps_visited);
//! # Ok(())
//! # }
//! ```

use crate::config::{Config, LimitsConfig};
use crate::fetcher::SitemapFetcher;
use crate::sitemap::{SitemapDocument, parse_document};
use crate::{Error, Result};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Outcome of a successful extraction.
#[derive(Debug)]
pub struct ExtractReport {
    /// Deduplicated page URLs in first-seen order.
    pub urls: Vec<String>,
    /// Number of distinct sitemap documents requested, including the root.
    pub sitemaps_visited: usize,
    /// Nested sitemaps that were abandoned, in no particular order.
    pub skipped: Vec<Error>,
}

/// Walks a sitemap (and any nested sitemap indexes) collecting page URLs.
#[derive(Debug, Clone)]
pub struct SitemapExtractor {
    fetcher: SitemapFetcher,
    limits: LimitsConfig,
    concurrency: usize,
}

impl SitemapExtractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Creates an extractor from fetch and limit settings.
    pub fn with_config(config: &Config) -> Result<Self> {
        Ok(Self {
            fetcher: SitemapFetcher::with_config(&config.fetch)?,
            limits: config.limits.clone(),
            concurrency: config.fetch.concurrency.max(1),
        })
    }

    /// Extract every page URL reachable from `root_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `root_url` is not an absolute http(s) URL (no request is made)
    /// - [`Error::FetchFailed`] if the root sitemap is unreachable or not XML
    /// - [`Error::NoUrlsFound`] if the walk completes without finding a page URL
    #[instrument(skip(self), fields(url = %root_url))]
    pub async fn extract(&self, root_url: &str) -> Result<ExtractReport> {
        self.extract_with_cancel(root_url, CancellationToken::new())
            .await
    }

    /// Like [`extract`](Self::extract), stopping early when `cancel` fires.
    ///
    /// In-flight fetches are abandoned and [`Error::Cancelled`] is returned.
    pub async fn extract_with_cancel(
        &self,
        root_url: &str,
        cancel: CancellationToken,
    ) -> Result<ExtractReport> {
        let root = validate_sitemap_url(root_url)?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Dropping this call (for example, when an HTTP client disconnects)
        // cancels spawned child walks too.
        let walk_token = cancel.child_token();
        let _walk_guard = walk_token.clone().drop_guard();

        let ctx = Arc::new(WalkContext::new(
            self.fetcher.clone(),
            self.limits.clone(),
            self.concurrency,
            walk_token,
        ));
        ctx.mark_visited(&root);

        let document = match ctx.load(&root).await {
            None => return Err(Error::Cancelled),
            Some(Err(err)) => return Err(root_failure(&root, err)),
            Some(Ok(document)) => document,
        };

        let found = collect(Arc::clone(&ctx), document, 0).await;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let urls = dedup_first_seen(found);
        let skipped = ctx.take_skipped();
        let sitemaps_visited = ctx.visited_count();

        info!(
            urls = urls.len(),
            sitemaps = sitemaps_visited,
            skipped = skipped.len(),
            "Sitemap extraction finished"
        );

        if urls.is_empty() {
            return Err(Error::NoUrlsFound);
        }

        Ok(ExtractReport {
            urls,
            sitemaps_visited,
            skipped,
        })
    }
}

/// Extract page URLs from a sitemap using default settings.
///
/// ```no_run
/// # async fn example() -> sitemapper_core::Result<()> {
/// let urls = sitemapper_core::extract_urls("https://example.com/sitemap.xml").await?;
/// for url in urls {
///     println!("{url}");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_urls(root_url: &str) -> Result<Vec<String>> {
    let extractor = SitemapExtractor::new()?;
    Ok(extractor.extract(root_url).await?.urls)
}

/// Check that `input` is an absolute `http`/`https` URL with a host.
///
/// Surrounding whitespace is ignored; the trimmed string is returned unchanged
/// (not re-serialised) so visited-set keys match the caller's spelling.
pub fn validate_sitemap_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("sitemap URL is empty".to_string()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::InvalidInput(format!("'{trimmed}' is not a valid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidInput(format!(
            "unsupported URL scheme '{}' (expected http or https)",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidInput(format!("'{trimmed}' has no host")));
    }

    Ok(trimmed.to_string())
}

/// Result of trying to reserve a sitemap URL for fetching.
#[derive(Debug, PartialEq, Eq)]
enum Claim {
    Claimed,
    AlreadyVisited,
    DepthExceeded,
    SitemapLimitReached,
}

/// Request-scoped walk state shared by every branch of one extraction.
struct WalkContext {
    fetcher: SitemapFetcher,
    limits: LimitsConfig,
    visited: Mutex<HashSet<String>>,
    skipped: Mutex<Vec<Error>>,
    permits: Semaphore,
    cancel: CancellationToken,
}

impl WalkContext {
    fn new(
        fetcher: SitemapFetcher,
        limits: LimitsConfig,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            limits,
            visited: Mutex::new(HashSet::new()),
            skipped: Mutex::new(Vec::new()),
            permits: Semaphore::new(concurrency),
            cancel,
        }
    }

    fn mark_visited(&self, url: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string());
    }

    /// Test-and-set on the visited set, also enforcing the walk limits.
    fn claim(&self, url: &str, depth: usize) -> Claim {
        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if visited.contains(url) {
            Claim::AlreadyVisited
        } else if depth > self.limits.max_depth {
            Claim::DepthExceeded
        } else if visited.len() >= self.limits.max_sitemaps {
            Claim::SitemapLimitReached
        } else {
            visited.insert(url.to_string());
            Claim::Claimed
        }
    }

    fn visited_count(&self) -> usize {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn skip(&self, err: Error) {
        warn!(category = err.category(), "{err}");
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }

    fn take_skipped(&self) -> Vec<Error> {
        std::mem::take(&mut *self.skipped.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Fetch and parse one sitemap. `None` means the walk was cancelled.
    async fn load(&self, url: &str) -> Option<Result<SitemapDocument>> {
        tokio::select! {
            () = self.cancel.cancelled() => None,
            result = self.fetch_and_parse(url) => Some(result),
        }
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<SitemapDocument> {
        debug!(url = %url, "Fetching sitemap");
        let body = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| Error::Cancelled)?;
            self.fetcher.fetch(url).await?
        };
        parse_document(&body)
    }
}

type BranchFuture = Pin<Box<dyn Future<Output = Vec<String>> + Send>>;

/// Walk one nested sitemap. Never fails: problems are recorded on the context.
///
/// Boxed so the recursion through [`collect`] has a nameable, `Send` future type
/// that `tokio::spawn` accepts.
fn walk_branch(ctx: Arc<WalkContext>, url: String, depth: usize) -> BranchFuture {
    Box::pin(async move {
        match ctx.claim(&url, depth) {
            Claim::Claimed => {},
            Claim::AlreadyVisited => {
                debug!(url = %url, "Sitemap already visited, skipping");
                return Vec::new();
            },
            Claim::DepthExceeded => {
                let reason = format!(
                    "index nesting depth {depth} exceeds max_depth {}",
                    ctx.limits.max_depth
                );
                ctx.skip(Error::LimitExceeded { url, reason });
                return Vec::new();
            },
            Claim::SitemapLimitReached => {
                let reason = format!(
                    "max_sitemaps limit of {} reached",
                    ctx.limits.max_sitemaps
                );
                ctx.skip(Error::LimitExceeded { url, reason });
                return Vec::new();
            },
        }

        let document = match ctx.load(&url).await {
            None => return Vec::new(),
            Some(Err(err)) => {
                ctx.skip(branch_failure(&url, err));
                return Vec::new();
            },
            Some(Ok(document)) => document,
        };

        collect(ctx, document, depth).await
    })
}

/// Dispatch on document kind: leaf URLs are returned, index children are walked
/// concurrently and their results merged in document order.
async fn collect(ctx: Arc<WalkContext>, document: SitemapDocument, depth: usize) -> Vec<String> {
    match document {
        SitemapDocument::UrlSet(urls) => {
            debug!(count = urls.len(), "Collected page URLs");
            urls
        },
        SitemapDocument::Unknown { root } => {
            debug!(root = %root, "Unrecognised root element, nothing to collect");
            Vec::new()
        },
        SitemapDocument::Index(children) => {
            debug!(child_count = children.len(), "Walking child sitemaps from index");

            let handles: Vec<_> = children
                .into_iter()
                .map(|child| tokio::spawn(walk_branch(Arc::clone(&ctx), child, depth + 1)))
                .collect();

            let mut urls = Vec::new();
            for handle in handles {
                match handle.await {
                    Ok(found) => urls.extend(found),
                    Err(e) => warn!(error = %e, "Child sitemap task panicked"),
                }
            }
            urls
        },
    }
}

fn branch_failure(url: &str, err: Error) -> Error {
    match err {
        Error::FetchFailed { reason, .. } => Error::BranchFetchFailed {
            url: url.to_string(),
            reason,
        },
        Error::Parse(reason) => Error::BranchParseFailed {
            url: url.to_string(),
            reason,
        },
        other => Error::BranchFetchFailed {
            url: url.to_string(),
            reason: other.to_string(),
        },
    }
}

fn root_failure(url: &str, err: Error) -> Error {
    match err {
        Error::FetchFailed { .. } | Error::Cancelled => err,
        Error::Parse(reason) => Error::FetchFailed {
            url: url.to_string(),
            reason: format!("invalid sitemap XML: {reason}"),
        },
        other => Error::FetchFailed {
            url: url.to_string(),
            reason: other.to_string(),
        },
    }
}

fn dedup_first_seen(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urlset(urls: &[&str]) -> String {
        let entries: String = urls
            .iter()
            .map(|u| format!("<url><loc>{u}</loc></url>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#
        )
    }

    fn index(children: &[String]) -> String {
        let entries: String = children
            .iter()
            .map(|u| format!("<sitemap><loc>{u}</loc></sitemap>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</sitemapindex>"#
        )
    }

    async fn serve(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("Content-Type", "application/xml"),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    fn extractor() -> SitemapExtractor {
        let mut config = Config::default();
        config.fetch.timeout_secs = 2;
        SitemapExtractor::with_config(&config).unwrap()
    }

    fn extractor_with_limits(max_depth: usize, max_sitemaps: usize) -> SitemapExtractor {
        let mut config = Config::default();
        config.fetch.timeout_secs = 2;
        config.limits = LimitsConfig {
            max_depth,
            max_sitemaps,
        };
        SitemapExtractor::with_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_extracts_leaf_sitemap() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/sitemap.xml",
            urlset(&["https://example.com/a", "https://example.com/b"]),
        )
        .await;

        let report = extractor()
            .extract(&format!("{}/sitemap.xml", server.uri()))
            .await
            .unwrap();

        assert_eq!(report.urls, vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(report.sitemaps_visited, 1);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_index_of_index() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/nested.xml"), format!("{base}/leaf-3.xml")]),
        )
        .await;
        serve(&server, "/nested.xml", index(&[format!("{base}/leaf-12.xml")])).await;
        serve(
            &server,
            "/leaf-12.xml",
            urlset(&["https://example.com/u1", "https://example.com/u2"]),
        )
        .await;
        serve(&server, "/leaf-3.xml", urlset(&["https://example.com/u3"])).await;

        let report = extractor()
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        // Document order is kept when merging branches.
        assert_eq!(
            report.urls,
            vec![
                "https://example.com/u1",
                "https://example.com/u2",
                "https://example.com/u3"
            ]
        );
        assert_eq!(report.sitemaps_visited, 4);
        assert!(!report.urls.iter().any(|u| u.starts_with(&base)));
    }

    #[tokio::test]
    async fn test_shared_leaf_fetched_once_and_deduplicated() {
        let server = MockServer::start().await;
        let base = server.uri();
        let leaf = format!("{base}/leaf.xml");
        serve(
            &server,
            "/sitemap.xml",
            index(&[leaf.clone(), format!("{base}/other-index.xml"), leaf.clone()]),
        )
        .await;
        serve(&server, "/other-index.xml", index(&[leaf.clone()])).await;
        // `.expect(1)` is verified when the mock server drops.
        serve(
            &server,
            "/leaf.xml",
            urlset(&["https://example.com/a", "https://example.com/a", "https://example.com/b"]),
        )
        .await;

        let report = extractor()
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        assert_eq!(report.urls, vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(report.sitemaps_visited, 3);
    }

    #[tokio::test]
    async fn test_cyclic_indexes_terminate() {
        let server = MockServer::start().await;
        let base = server.uri();
        let a = format!("{base}/a.xml");
        let b = format!("{base}/b.xml");
        serve(
            &server,
            "/a.xml",
            index(&[b.clone(), format!("{base}/leaf-a.xml")]),
        )
        .await;
        serve(
            &server,
            "/b.xml",
            index(&[a.clone(), b.clone(), format!("{base}/leaf-b.xml")]),
        )
        .await;
        serve(&server, "/leaf-a.xml", urlset(&["https://example.com/from-a"])).await;
        serve(&server, "/leaf-b.xml", urlset(&["https://example.com/from-b"])).await;

        let report = extractor().extract(&a).await.unwrap();

        let mut urls = report.urls.clone();
        urls.sort();
        assert_eq!(urls, vec!["https://example.com/from-a", "https://example.com/from-b"]);
    }

    #[tokio::test]
    async fn test_unreachable_branch_is_skipped() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/gone.xml"), format!("{base}/ok.xml")]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/gone.xml"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        serve(&server, "/ok.xml", urlset(&["https://example.com/u1"])).await;

        let report = extractor()
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        assert_eq!(report.urls, vec!["https://example.com/u1"]);
        assert_eq!(report.skipped.len(), 1);
        match &report.skipped[0] {
            Error::BranchFetchFailed { url, reason } => {
                assert!(url.ends_with("/gone.xml"));
                assert!(reason.contains("500"));
            },
            other => panic!("Expected BranchFetchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_error_branch_is_skipped() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[
                "http://127.0.0.1:9/unreachable.xml".to_string(),
                format!("{base}/ok.xml"),
            ]),
        )
        .await;
        serve(&server, "/ok.xml", urlset(&["https://example.com/u1"])).await;

        let report = extractor()
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        assert_eq!(report.urls, vec!["https://example.com/u1"]);
        assert!(matches!(report.skipped[0], Error::BranchFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_unparsable_branch_is_skipped() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/broken.xml"), format!("{base}/ok.xml")]),
        )
        .await;
        serve(&server, "/broken.xml", "<urlset><url><loc>x</url>".to_string()).await;
        serve(&server, "/ok.xml", urlset(&["https://example.com/u1"])).await;

        let report = extractor()
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        assert_eq!(report.urls, vec!["https://example.com/u1"]);
        assert!(matches!(report.skipped[0], Error::BranchParseFailed { .. }));
    }

    #[tokio::test]
    async fn test_root_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = extractor()
            .extract(&format!("{}/sitemap.xml", server.uri()))
            .await;

        assert!(matches!(result, Err(Error::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn test_root_parse_failure_is_fatal() {
        let server = MockServer::start().await;
        serve(&server, "/sitemap.xml", "not xml at all".to_string()).await;

        let result = extractor()
            .extract(&format!("{}/sitemap.xml", server.uri()))
            .await;

        match result {
            Err(Error::FetchFailed { reason, .. }) => assert!(reason.contains("invalid sitemap XML")),
            other => panic!("Expected FetchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_root_yields_no_urls() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/feed.xml",
            "<rss><channel><item><link>https://example.com/a</link></item></channel></rss>"
                .to_string(),
        )
        .await;

        let result = extractor()
            .extract(&format!("{}/feed.xml", server.uri()))
            .await;

        assert!(matches!(result, Err(Error::NoUrlsFound)));
    }

    #[tokio::test]
    async fn test_index_with_only_failing_children_yields_no_urls() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(&server, "/sitemap.xml", index(&[format!("{base}/gone.xml")])).await;
        Mock::given(method("GET"))
            .and(path("/gone.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = extractor()
            .extract(&format!("{base}/sitemap.xml"))
            .await;

        assert!(matches!(result, Err(Error::NoUrlsFound)));
    }

    #[tokio::test]
    async fn test_invalid_root_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for input in ["not a url", "", "   ", "ftp://example.com/sitemap.xml", "/sitemap.xml"] {
            let result = extractor().extract(input).await;
            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "'{input}' should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_depth_limit_skips_deep_branches() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/level-1.xml"), format!("{base}/leaf-0.xml")]),
        )
        .await;
        serve(&server, "/level-1.xml", index(&[format!("{base}/leaf-2.xml")])).await;
        serve(&server, "/leaf-0.xml", urlset(&["https://example.com/shallow"])).await;
        Mock::given(method("GET"))
            .and(path("/leaf-2.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&["https://example.com/deep"])))
            .expect(0)
            .mount(&server)
            .await;

        let report = extractor_with_limits(1, 100)
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        assert_eq!(report.urls, vec!["https://example.com/shallow"]);
        assert!(matches!(report.skipped[0], Error::LimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_sitemap_count_limit() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/leaf-1.xml"), format!("{base}/leaf-2.xml")]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/leaf-1.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&["https://example.com/1"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/leaf-2.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&["https://example.com/2"])))
            .mount(&server)
            .await;

        let report = extractor_with_limits(8, 2)
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        // Root plus one leaf fit in the budget; which leaf wins depends on scheduling.
        assert_eq!(report.sitemaps_visited, 2);
        assert_eq!(report.urls.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0], Error::LimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = extractor()
            .extract_with_cancel(&format!("{}/sitemap.xml", server.uri()), cancel)
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
    }

    fn cancel_after(token: &CancellationToken, delay: Duration) {
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trigger.cancel();
        });
    }

    fn patient_extractor() -> SitemapExtractor {
        let mut config = Config::default();
        config.fetch.timeout_secs = 10;
        SitemapExtractor::with_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_cancel_while_root_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(urlset(&["https://example.com/late"]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel_after(&cancel, Duration::from_millis(200));

        let start = Instant::now();
        let result = patient_extractor()
            .extract_with_cancel(&format!("{}/sitemap.xml", server.uri()), cancel)
            .await;

        assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_cancel_mid_walk_stops_child_fetches() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/fast.xml"), format!("{base}/nested.xml")]),
        )
        .await;
        serve(&server, "/fast.xml", urlset(&["https://example.com/fast"])).await;
        Mock::given(method("GET"))
            .and(path("/nested.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(index(&[format!("{base}/deep.xml")]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/deep.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&["https://example.com/deep"])))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel_after(&cancel, Duration::from_millis(300));

        let start = Instant::now();
        let result = patient_extractor()
            .extract_with_cancel(&format!("{base}/sitemap.xml"), cancel)
            .await;

        // Partial results from the fast branch are discarded too.
        assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_oversized_branch_is_skipped() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/ok.xml"), format!("{base}/huge.xml")]),
        )
        .await;
        serve(&server, "/ok.xml", urlset(&["https://example.com/ok"])).await;
        serve(
            &server,
            "/huge.xml",
            urlset(&[&format!("https://example.com/{}", "x".repeat(4096))]),
        )
        .await;

        let mut config = Config::default();
        config.fetch.timeout_secs = 2;
        config.fetch.max_body_bytes = 2048;
        let report = SitemapExtractor::with_config(&config)
            .unwrap()
            .extract(&format!("{base}/sitemap.xml"))
            .await
            .unwrap();

        assert_eq!(report.urls, vec!["https://example.com/ok"]);
        assert_eq!(report.skipped.len(), 1);
        match &report.skipped[0] {
            Error::BranchFetchFailed { url, reason } => {
                assert!(url.ends_with("/huge.xml"));
                assert!(reason.contains("exceeds 2048 bytes"), "reason: {reason}");
            },
            other => panic!("Expected BranchFetchFailed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_urls_convenience() {
        let server = MockServer::start().await;
        serve(&server, "/sitemap.xml", urlset(&["https://example.com/only"])).await;

        let urls = extract_urls(&format!("{}/sitemap.xml", server.uri()))
            .await
            .unwrap();
        assert_eq!(urls, vec!["https://example.com/only"]);
    }

    #[test]
    fn test_validate_sitemap_url() {
        assert_eq!(
            validate_sitemap_url("  https://example.com/sitemap.xml ").unwrap(),
            "https://example.com/sitemap.xml"
        );
        assert!(validate_sitemap_url("http://localhost:8080/s.xml").is_ok());
        assert!(validate_sitemap_url("mailto:someone@example.com").is_err());
        assert!(validate_sitemap_url("https://").is_err());
        assert!(validate_sitemap_url("example.com/sitemap.xml").is_err());
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let input = vec!["b", "a", "b", "c", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dedup_first_seen(input), vec!["b", "a", "c"]);
    }
}
