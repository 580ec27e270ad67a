//! Minimal HTTP client for fetching public HTML pages with safe logging.
//!
//! - Request options: timeout, absolute-URL passthrough
//! - Every request is bounded by a timeout; expiry surfaces as [`HttpError::Timeout`]
//! - Single attempt per request: callers decide what a failure means
//! - Optional *raw* request/response logging via `VAXTRACK_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), vaxtrack_http::HttpError> {
//! let client = vaxtrack_http::HttpClient::new("https://www.info.gov.hk")?;
//! let page = client
//!     .get_text("gia/general/202103/15.htm", vaxtrack_http::RequestOpts::default())
//!     .await?;
//! println!("{} bytes from {}", page.body.len(), page.url);
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and
//! (optionally) raw request/response lines (target `http.raw`).

use reqwest::{Client, Method, StatusCode, Url};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "VAXTRACK_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug.
fn make_curl(method: &Method, url: &Url) -> String {
    format!("curl -X{} '{}'", method, url.as_str().replace('\'', r"'\''"))
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },
    #[error("server returned {status} for {url}: {body_snippet}")]
    Status {
        status: StatusCode,
        url: String,
        body_snippet: String,
    },
}

// ==============================
// Request options & responses
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use std::time::Duration;
/// use vaxtrack_http::RequestOpts;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     allow_absolute: true,
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 5);
/// assert!(opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// A successfully fetched page.
#[derive(Clone, Debug)]
pub struct Page {
    /// Final URL after redirects.
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use vaxtrack_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://www.info.gov.hk")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(30),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// GET a page and decode its body as text.
    ///
    /// Any non-2xx status is an error; the body is not inspected further.
    pub async fn get_text(&self, path: &str, opts: RequestOpts) -> Result<Page, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let timeout_ms = timeout.as_millis() as u64;

        let rb = self.inner.get(url.clone()).timeout(timeout);

        // Lightweight request id without extra deps
        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        tracing::debug!(
            req_id=%req_id,
            method="GET",
            host_path=%format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            timeout_ms,
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&Method::GET, &url);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb
            .send()
            .await
            .map_err(|e| classify(&req_id, &url, timeout_ms, e, "http.network_error.send"))?;
        let status = resp.status();
        let final_url = resp.url().clone();
        let body = resp
            .text()
            .await
            .map_err(|e| classify(&req_id, &url, timeout_ms, e, "http.network_error.body"))?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=body.len(),
            final_url=%final_url,
            "http.response.headers"
        );

        if raw_enabled() {
            let truncated = body.len() > RAW_MAX_BODY;
            let text = truncate_chars(&body, RAW_MAX_BODY);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&body);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if !status.is_success() {
            tracing::warn!(
                req_id=%req_id,
                %status,
                url=%url,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Status {
                status,
                url: url.to_string(),
                body_snippet: snippet,
            });
        }

        Ok(Page {
            url: final_url,
            status,
            body,
        })
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }
}

// ==============================
// Helpers
// ==============================

fn classify(req_id: &str, url: &Url, timeout_ms: u64, err: reqwest::Error, event: &str) -> HttpError {
    if err.is_timeout() {
        tracing::warn!(req_id=%req_id, url=%url, timeout_ms, "http.timeout");
        return HttpError::Timeout {
            url: url.to_string(),
            timeout_ms,
        };
    }
    let message = err.to_string();
    tracing::warn!(req_id=%req_id, url=%url, message=%message, event, "http.network_error");
    HttpError::Network(message)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn snip_body(body: &str) -> String {
    let mut snip = truncate_chars(body, 500).to_string();
    if snip.len() < body.len() {
        snip.push_str("...");
    }
    snip
}
