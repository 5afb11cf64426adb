//! Query resolution
//!
//! Turns a raw query into the plain text that gets embedded. Literal text
//! passes through unchanged. An absolute URL is fetched (bounded by a
//! timeout) and reduced to plain text; any failure falls back to the raw
//! query string and is only logged.

use async_trait::async_trait;
use regex_lite::Regex;
use skillmatch_common::config::ResolverConfig;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors from fetching a query URL. Never surfaced to callers.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of page content for URL queries
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw body of `url`
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// How a query was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    /// Not a URL, used verbatim
    Text,
    /// URL fetched and reduced to page text
    Url,
    /// URL whose fetch failed, used verbatim
    UrlFallback,
}

impl QuerySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuerySource::Text => "text",
            QuerySource::Url => "url",
            QuerySource::UrlFallback => "url_fallback",
        }
    }
}

/// Plain text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub text: String,
    pub source: QuerySource,
}

/// Resolves raw queries into embeddable text
#[derive(Clone)]
pub struct QueryResolver {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
    max_chars: usize,
}

impl QueryResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, timeout: Duration, max_chars: usize) -> Self {
        Self {
            fetcher,
            timeout,
            max_chars,
        }
    }

    /// Resolver backed by [`HttpFetcher`]
    pub fn from_config(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Arc::new(HttpFetcher::new(config)?),
            config.fetch_timeout(),
            config.max_chars,
        ))
    }

    /// Resolve a raw query. Never fails.
    pub async fn resolve(&self, raw: &str) -> ResolvedQuery {
        let Ok(url) = Url::parse(raw) else {
            return ResolvedQuery {
                text: raw.to_string(),
                source: QuerySource::Text,
            };
        };

        let start = Instant::now();
        let fetched = match tokio::time::timeout(self.timeout, self.fetcher.fetch(&url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };
        let elapsed = start.elapsed().as_secs_f64();

        match fetched {
            Ok(body) => {
                skillmatch_common::metrics::record_url_fetch(elapsed, true);
                let text = truncate_utf16(&markup_to_text(&body), self.max_chars);
                debug!(url = %url, chars = text.chars().count(), "Extracted text from URL");
                ResolvedQuery {
                    text,
                    source: QuerySource::Url,
                }
            }
            Err(e) => {
                skillmatch_common::metrics::record_url_fetch(elapsed, false);
                warn!(url = %url, error = %e, "Failed to extract text from URL, using it as query");
                ResolvedQuery {
                    text: raw.to_string(),
                    source: QuerySource::UrlFallback,
                }
            }
        }
    }
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Replace every `<...>` span with a space, collapse whitespace and trim
pub fn markup_to_text(html: &str) -> String {
    let stripped = tag_pattern().replace_all(html, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_units` UTF-16 code units, dropping a character that
/// would be cut in half
fn truncate_utf16(text: &str, max_units: usize) -> String {
    let mut units = 0;
    let end = text
        .char_indices()
        .find(|(_, c)| {
            units += c.len_utf16();
            units > max_units
        })
        .map_or(text.len(), |(i, _)| i);
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticFetcher {
        body: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &Url) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<String, FetchError> {
            Err(FetchError::Status(404))
        }
    }

    struct SlowFetcher;

    #[async_trait]
    impl PageFetcher for SlowFetcher {
        async fn fetch(&self, _url: &Url) -> Result<String, FetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".to_string())
        }
    }

    fn resolver(fetcher: Arc<dyn PageFetcher>) -> QueryResolver {
        QueryResolver::new(fetcher, Duration::from_millis(100), 2000)
    }

    #[test]
    fn test_markup_to_text() {
        let html = "<html><head><title>Java Developer</title></head>\n<body><p>Needs   <b>strong</b>\n\tskills</p></body></html>";
        assert_eq!(markup_to_text(html), "Java Developer Needs strong skills");
    }

    #[test]
    fn test_schemeless_host_is_plain_text() {
        let fetcher = Arc::new(StaticFetcher {
            body: "unused".to_string(),
            calls: AtomicUsize::new(0),
        });
        let resolved = tokio_test::block_on(resolver(fetcher.clone()).resolve("jobs.example.com/posting"));

        assert_eq!(resolved.text, "jobs.example.com/posting");
        assert_eq!(resolved.source, QuerySource::Text);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_truncation_counts_utf16_units() {
        assert_eq!(truncate_utf16("abcdef", 4), "abcd");
        assert_eq!(truncate_utf16("ab😀cd", 4), "ab😀");
        // A surrogate pair is never split
        assert_eq!(truncate_utf16("ab😀cd", 3), "ab");
        assert_eq!(truncate_utf16("héllo", 10), "héllo");
    }

    #[test]
    fn test_plain_text_is_never_fetched() {
        let fetcher = Arc::new(StaticFetcher {
            body: "unused".to_string(),
            calls: AtomicUsize::new(0),
        });
        let resolved = tokio_test::block_on(resolver(fetcher.clone()).resolve("hire java devs"));

        assert_eq!(resolved.text, "hire java devs");
        assert_eq!(resolved.source, QuerySource::Text);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_url_is_fetched_and_stripped() {
        let fetcher = Arc::new(StaticFetcher {
            body: "<div>Senior <em>Python</em> engineer</div>".to_string(),
            calls: AtomicUsize::new(0),
        });
        let resolved = resolver(fetcher.clone()).resolve("https://jobs.example.com/1").await;

        assert_eq!(resolved.text, "Senior Python engineer");
        assert_eq!(resolved.source, QuerySource::Url);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_page_text_is_truncated() {
        let fetcher = Arc::new(StaticFetcher {
            body: format!("<p>{}</p>", "é".repeat(5000)),
            calls: AtomicUsize::new(0),
        });
        let resolved = resolver(fetcher).resolve("https://jobs.example.com/long").await;
        assert_eq!(resolved.text.chars().count(), 2000);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_url() {
        let url = "https://jobs.example.com/missing";
        let resolved = resolver(Arc::new(FailingFetcher)).resolve(url).await;

        assert_eq!(resolved.text, url);
        assert_eq!(resolved.source, QuerySource::UrlFallback);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_url() {
        let url = "https://jobs.example.com/slow";
        let start = Instant::now();
        let resolved = resolver(Arc::new(SlowFetcher)).resolve(url).await;

        assert_eq!(resolved.text, url);
        assert_eq!(resolved.source, QuerySource::UrlFallback);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_http_fetcher_connection_refused_falls_back() {
        // Reserve a port, then close it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/job", port);

        let resolver = QueryResolver::from_config(&ResolverConfig::default()).unwrap();
        let resolved = resolver.resolve(&url).await;

        assert_eq!(resolved.text, url);
        assert_eq!(resolved.source, QuerySource::UrlFallback);
    }
}
