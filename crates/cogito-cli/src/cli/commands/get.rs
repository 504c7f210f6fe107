//! `in`: validate the source and echo the version.

use anyhow::{Context, Result};
use cogito_core::resource::{get, GetRequest};
use std::io::Write;
use std::path::Path;

use super::write_response;

pub fn run_get(request: &[u8], dest: &Path, output: &mut impl Write) -> Result<()> {
    let req: GetRequest =
        serde_json::from_slice(request).context("parsing request JSON")?;
    tracing::debug!(dest = %dest.display(), "get");
    let response = get::run(req)?;
    write_response(output, &response)
}
