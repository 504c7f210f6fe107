//! GitHub App installation tokens.
//!
//! A JWT signed with the App's RSA key is exchanged for an installation
//! access token, valid for one hour. Tokens are minted per publish and never
//! stored. The exchange is not retried.

use chrono::{DateTime, Utc};
use http::Method;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::transport::{self, Request, TransportError};

/// `exp - iat` of the App JWT.
pub const JWT_LIFETIME_SECS: i64 = 120;

/// Backdating of `iat` to tolerate clock drift towards the server.
const JWT_BACKDATE_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("parsing github_app.private_key: {0}")]
    Key(jsonwebtoken::errors::Error),
    #[error("signing github app JWT: {0}")]
    Sign(jsonwebtoken::errors::Error),
    #[error("generating installation token: http client Do: {0}")]
    Transport(TransportError),
    #[error("generating installation token: POST {url}: {status}\nBody: {body}")]
    Status {
        url: String,
        status: String,
        body: String,
    },
    #[error("decoding installation token response: {0}")]
    Decode(serde_json::Error),
}

/// GitHub App credentials for one installation.
pub struct AppIdentity {
    pub client_id: String,
    pub installation_id: i64,
    private_key: String,
    key: OnceLock<EncodingKey>,
}

impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("client_id", &self.client_id)
            .field("installation_id", &self.installation_id)
            .field("private_key", &"***REDACTED***")
            .finish()
    }
}

#[derive(Serialize)]
struct Claims {
    iss: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct InstallationToken {
    token: String,
}

impl AppIdentity {
    /// `private_key` is PEM, PKCS#1 or PKCS#8. Parsing is deferred to first use.
    pub fn new(client_id: impl Into<String>, installation_id: i64, private_key: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            installation_id,
            private_key: private_key.into(),
            key: OnceLock::new(),
        }
    }

    /// Parsed key, computed once.
    fn encoding_key(&self) -> Result<&EncodingKey, TokenError> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(TokenError::Key)?;
        Ok(self.key.get_or_init(|| key))
    }

    /// RS256 JWT identifying the App. Timestamps are whole seconds; GitHub
    /// rejects fractional ones.
    pub fn sign_jwt(&self, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp() - JWT_BACKDATE_SECS;
        let claims = Claims {
            iss: self.client_id.clone(),
            iat,
            exp: iat + JWT_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, self.encoding_key()?)
            .map_err(TokenError::Sign)
    }
}

/// Exchanges a freshly signed JWT for an installation access token.
pub fn mint_installation_token(server: &str, identity: &AppIdentity) -> Result<String, TokenError> {
    let jwt = identity.sign_jwt(Utc::now())?;
    let url = format!(
        "{}/app/installations/{}/access_tokens",
        server.trim_end_matches('/'),
        identity.installation_id
    );
    let req = Request::new(Method::POST, &url)
        .header("Authorization", format!("Bearer {}", jwt))
        .header("Accept", "application/vnd.github.v3+json");

    let outcome = transport::execute(&req).map_err(TokenError::Transport)?;
    if outcome.status != 201 {
        return Err(TokenError::Status {
            url,
            status: outcome.status_line(),
            body: outcome.body,
        });
    }
    let parsed: InstallationToken =
        serde_json::from_str(&outcome.body).map_err(TokenError::Decode)?;
    tracing::debug!(
        client_id = %identity.client_id,
        installation_id = identity.installation_id,
        "minted installation token"
    );
    Ok(parsed.token)
}
