//! Single HTTP exchange with the hosting provider.
//!
//! Uses the curl crate (libcurl) to perform one request and capture the
//! status, the trimmed body and the metadata headers the retry layer needs:
//! OAuth scopes, `X-RateLimit-Remaining`, `X-RateLimit-Reset` and `Date`.
//! No retry and no status inspection happen here.

mod parse;

use chrono::{DateTime, Utc};
use http::Method;
use std::fmt;
use std::str;
use std::time::Duration;

/// Hard per-attempt timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bodies larger than this are truncated; error bodies from the API are small.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Outbound request: method, absolute URL, extra headers, optional body.
#[derive(Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

impl fmt::Debug for Request {
    // Authorization values never reach the logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "***REDACTED***")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// Structured result of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    pub status: u16,
    /// Reason phrase from the status line, or the canonical one for HTTP/2.
    pub status_text: String,
    /// Response body, trimmed of surrounding whitespace.
    pub body: String,
    /// `X-Accepted-OAuth-Scopes`, verbatim.
    pub accepted_oauth_scopes: String,
    /// `X-OAuth-Scopes`, verbatim.
    pub oauth_scopes: String,
    /// `X-RateLimit-Remaining`; 0 when absent or unparseable.
    pub rate_limit_remaining: u64,
    /// `X-RateLimit-Reset`; the epoch when absent or unparseable.
    pub rate_limit_reset: DateTime<Utc>,
    /// Server wall clock from the `Date` header.
    pub date: DateTime<Utc>,
}

impl HttpOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 403 with an exhausted quota; any other 403 is an authorization failure.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 403 && self.rate_limit_remaining == 0
    }

    /// `"404 Not Found"`.
    pub fn status_line(&self) -> String {
        if self.status_text.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.status_text)
        }
    }
}

/// Failure to obtain an [`HttpOutcome`] at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("response has no Date header")]
    MissingDate,
    #[error("parsing Date header {value:?}: {source}")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Performs `req` with the default 30 second timeout.
pub fn execute(req: &Request) -> Result<HttpOutcome, TransportError> {
    execute_with_timeout(req, REQUEST_TIMEOUT)
}

/// Performs `req` in the current thread. Redirects are not followed.
pub fn execute_with_timeout(req: &Request, timeout: Duration) -> Result<HttpOutcome, TransportError> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(&req.url)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(timeout))?;
    easy.timeout(timeout)?;
    easy.useragent(concat!("cogito/", env!("CARGO_PKG_VERSION")))?;

    if req.method == Method::GET {
        easy.get(true)?;
    } else if req.method == Method::POST {
        easy.post(true)?;
        easy.post_fields_copy(req.body.as_deref().unwrap_or_default())?;
    } else {
        easy.custom_request(req.method.as_str())?;
        if let Some(b) = &req.body {
            easy.post_fields_copy(b)?;
        }
    }

    let mut list = curl::easy::List::new();
    for (k, v) in &req.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    // Suppress `Expect: 100-continue` on POST bodies.
    list.append("Expect:")?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            let room = MAX_BODY_BYTES.saturating_sub(body.len());
            body.extend_from_slice(&data[..data.len().min(room)]);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    tracing::debug!(method = %req.method, url = %req.url, status = code, "http exchange");
    parse::parse_response(code as u16, &header_lines, &body)
}
