//! Concourse resource protocol: `check`, `in` and `out`.
//!
//! Each command reads one JSON request from stdin and writes one JSON value to
//! stdout. The resource has no real versions; it always reports `dummy`.

pub mod chat;
pub mod check;
pub mod env;
pub mod get;
pub mod params;
pub mod put;
pub mod source;

use serde::{Deserialize, Serialize};

pub use env::BuildEnv;
pub use params::{BuildState, PutParams};
pub use source::{GitHubApp, Sink, Source, SourceError};

pub const DUMMY_VERSION: &str = "dummy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Version {
    pub fn dummy() -> Self {
        Self {
            reference: DUMMY_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
}

#[derive(Debug, Deserialize)]
pub struct GetRequest {
    pub source: Source,
    pub version: Version,
    /// `in` takes no parameters; whatever Concourse passes is ignored.
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PutRequest {
    pub source: Source,
    #[serde(default)]
    pub params: PutParams,
}

/// Response of `in` and `out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: Version,
    pub metadata: Vec<Metadata>,
}

/// `source.log_level` of a raw request, if any, so logging can be set up
/// before the request is fully decoded and validated.
pub fn peek_log_level(input: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(input).ok()?;
    value
        .get("source")?
        .get("log_level")?
        .as_str()
        .map(str::to_string)
}
