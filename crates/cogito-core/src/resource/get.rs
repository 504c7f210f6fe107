//! `in`: nothing to fetch; echo the requested version back.

use anyhow::Result;

use super::{GetRequest, VersionResponse};

pub fn run(req: GetRequest) -> Result<VersionResponse> {
    req.source.validate()?;
    tracing::debug!(source = ?req.source, version = ?req.version, "get");
    Ok(VersionResponse {
        version: req.version,
        metadata: Vec::new(),
    })
}
