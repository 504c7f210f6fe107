//! `source:` configuration of the resource.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::params::BuildState;
use crate::gchat::redact_webhook;
use crate::github::{AppIdentity, Credentials};

const REDACTED: &str = "***REDACTED***";

/// Where a build state is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sink {
    Github,
    Gchat,
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubApp {
    pub client_id: String,
    pub installation_id: Option<i64>,
    /// PEM encoded RSA private key.
    pub private_key: String,
}

impl fmt::Debug for GitHubApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubApp")
            .field("client_id", &self.client_id)
            .field("installation_id", &self.installation_id)
            .field("private_key", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Source {
    pub owner: String,
    pub repo: String,
    pub access_token: Option<String>,
    pub github_app: Option<GitHubApp>,
    /// GitHub Enterprise host; empty means github.com.
    pub github_hostname: Option<String>,
    pub context_prefix: Option<String>,
    pub omit_target_url: bool,
    pub log_level: Option<String>,
    pub gchat_webhook: Option<String>,
    pub chat_notify_on_states: Option<Vec<BuildState>>,
    pub chat_append_summary: Option<bool>,
    pub sinks: Option<Vec<Sink>>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("access_token", &self.access_token.as_ref().map(|_| REDACTED))
            .field("github_app", &self.github_app)
            .field("github_hostname", &self.github_hostname)
            .field("context_prefix", &self.context_prefix)
            .field("omit_target_url", &self.omit_target_url)
            .field("log_level", &self.log_level)
            .field(
                "gchat_webhook",
                &self.gchat_webhook.as_deref().map(redact_webhook),
            )
            .field("chat_notify_on_states", &self.chat_notify_on_states)
            .field("chat_append_summary", &self.chat_append_summary)
            .field("sinks", &self.sinks)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source: missing keys: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),
    #[error("source: access_token and github_app are mutually exclusive")]
    CredentialsConflict,
    #[error("source: one of access_token or github_app must be specified")]
    NoCredentials,
    #[error("source: invalid github_app.installation_id {0} (must be positive)")]
    InstallationId(i64),
    #[error("source: invalid log_level {0:?} (valid: debug, info, warn, error)")]
    LogLevel(String),
}

const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

fn is_blank(s: &Option<String>) -> bool {
    s.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl Source {
    pub fn validate(&self) -> Result<(), SourceError> {
        let mut missing = Vec::new();
        if self.owner.trim().is_empty() {
            missing.push("owner");
        }
        if self.repo.trim().is_empty() {
            missing.push("repo");
        }
        if !missing.is_empty() {
            return Err(SourceError::MissingKeys(missing));
        }

        match (is_blank(&self.access_token), &self.github_app) {
            (false, Some(_)) => return Err(SourceError::CredentialsConflict),
            (true, None) => return Err(SourceError::NoCredentials),
            (true, Some(app)) => {
                let mut missing = Vec::new();
                if app.client_id.trim().is_empty() {
                    missing.push("github_app.client_id");
                }
                if app.installation_id.is_none() {
                    missing.push("github_app.installation_id");
                }
                if app.private_key.trim().is_empty() {
                    missing.push("github_app.private_key");
                }
                if !missing.is_empty() {
                    return Err(SourceError::MissingKeys(missing));
                }
                if let Some(id) = app.installation_id.filter(|id| *id <= 0) {
                    return Err(SourceError::InstallationId(id));
                }
            }
            (false, None) => {}
        }

        if let Some(level) = &self.log_level {
            if !level.is_empty() && !LOG_LEVELS.contains(&level.as_str()) {
                return Err(SourceError::LogLevel(level.clone()));
            }
        }
        Ok(())
    }

    /// Credentials for the GitHub sink. Call after [`Source::validate`].
    pub fn credentials(&self) -> Result<Credentials, SourceError> {
        match (&self.access_token, &self.github_app) {
            (Some(token), None) if !token.trim().is_empty() => {
                Ok(Credentials::PersonalToken(token.clone()))
            }
            (_, Some(app)) if is_blank(&self.access_token) => Ok(Credentials::App(
                AppIdentity::new(
                    app.client_id.clone(),
                    app.installation_id.unwrap_or_default(),
                    app.private_key.clone(),
                ),
            )),
            (_, Some(_)) => Err(SourceError::CredentialsConflict),
            _ => Err(SourceError::NoCredentials),
        }
    }
}
