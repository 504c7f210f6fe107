//! GitHub commit-status publishing.
//!
//! [`StatusClient`] writes one commit status through the retry layer.
//! Credentials are either a personal access token or a GitHub App identity,
//! in which case a short-lived installation token is minted per publish.

mod app_token;
mod error;
mod status;

pub use app_token::{mint_installation_token, AppIdentity, TokenError, JWT_LIFETIME_SECS};
pub use error::{GitHubError, StatusError};
pub use status::{CommitStatusRequest, StatusClient, StatusState};

use crate::retry::RetryPolicy;
use std::fmt;

pub const PUBLIC_API_URL: &str = "https://api.github.com";

/// Where to publish, and how hard to try. Lives for one publish.
#[derive(Debug, Clone)]
pub struct Target {
    /// API base URL without trailing slash.
    pub server: String,
    pub retry: RetryPolicy,
}

impl Target {
    pub fn new(server: impl Into<String>, retry: RetryPolicy) -> Self {
        let server = server.into().trim_end_matches('/').to_string();
        Self { server, retry }
    }

    /// Browser-facing base URL matching the API server, used in hints.
    pub fn web_url(&self) -> String {
        if self.server == PUBLIC_API_URL {
            return "https://github.com".to_string();
        }
        self.server
            .strip_suffix("/api/v3")
            .unwrap_or(&self.server)
            .to_string()
    }
}

/// API base URL for a configured hostname.
///
/// Empty or `github.com` selects the public service; a value carrying a
/// scheme is taken as the complete API URL; any other host is treated as
/// GitHub Enterprise.
pub fn api_base_url(hostname: Option<&str>) -> String {
    match hostname.map(str::trim) {
        None | Some("") | Some("github.com") => PUBLIC_API_URL.to_string(),
        Some(h) if h.contains("://") => h.trim_end_matches('/').to_string(),
        Some(h) => format!("https://{}/api/v3", h.trim_end_matches('/')),
    }
}

/// Exactly one way to authenticate.
pub enum Credentials {
    PersonalToken(String),
    App(AppIdentity),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::PersonalToken(_) => f.write_str("PersonalToken(***REDACTED***)"),
            Credentials::App(id) => f.debug_tuple("App").field(id).finish(),
        }
    }
}
