//! Page fetching with bot-block detection.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;

/// Chrome desktop user agent sent with every fetch.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Reason reported for firewall challenges and implausibly small pages.
pub const ANTI_BOT_REASON: &str =
    "Website blocked the request. This site uses anti-bot protection.";

/// Bodies shorter than this are treated as challenge pages.
pub const MIN_PAGE_CHARS: usize = 1000;

/// Body markers of known firewall or bot-challenge pages.
pub const FIREWALL_MARKERS: &[&str] = &["Sucuri Website Firewall", "Access Denied", "blocked"];

/// Result of fetching a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page that passed block detection.
    Page { html: String, status: u16 },
    /// The page could not be used; `reason` is user-facing.
    Blocked { reason: String },
}

impl FetchOutcome {
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Retrieves a page's HTML. Never errors: failures become [`FetchOutcome::Blocked`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Classify a response, returning the blocked reason if it is unusable.
pub fn detect_block(status: u16, body: &str) -> Option<String> {
    if !(200..300).contains(&status) {
        return Some(format!("Failed to fetch: HTTP {}", status));
    }
    if FIREWALL_MARKERS.iter().any(|marker| body.contains(marker))
        || body.chars().count() < MIN_PAGE_CHARS
    {
        return Some(ANTI_BOT_REASON.to_string());
    }
    None
}

/// Browser-like headers that get past trivial bot filters.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// [`PageFetcher`] over HTTP.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher; `timeout` of `None` keeps the transport default.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().default_headers(browser_headers());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create from `FETCH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, FetchError> {
        let timeout = match std::env::var("FETCH_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.trim().parse().map_err(|_| {
                FetchError::Config(format!("FETCH_TIMEOUT_SECS must be an integer, got '{}'", raw))
            })?)),
            Err(_) => None,
        };
        info!(
            subsystem = "import",
            component = "fetcher",
            timeout_secs = timeout.map(|t| t.as_secs()),
            "Initializing HTTP page fetcher"
        );
        Self::new(timeout)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(subsystem = "import", component = "fetcher", op = "fetch"))]
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let start = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                return FetchOutcome::blocked(format!("Failed to fetch: {}", e));
            }
        };

        let status = response.status().as_u16();
        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                warn!(http_status = status, error = %e, "Failed to read response body");
                return FetchOutcome::blocked(format!("Failed to fetch: {}", e));
            }
        };

        if let Some(reason) = detect_block(status, &html) {
            warn!(
                http_status = status,
                content_len = html.len(),
                reason = %reason,
                "Fetch blocked"
            );
            return FetchOutcome::blocked(reason);
        }

        debug!(
            http_status = status,
            content_len = html.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched page"
        );
        FetchOutcome::Page { html, status }
    }
}
