//! `check`: the resource has no versions of its own.

use anyhow::Result;

use super::{CheckRequest, Version};

pub fn run(req: &CheckRequest) -> Result<Vec<Version>> {
    req.source.validate()?;
    tracing::debug!(source = ?req.source, version = ?req.version, "check");
    Ok(vec![Version::dummy()])
}
