//! `check`: validate the source and report the dummy version.

use anyhow::{Context, Result};
use cogito_core::resource::{check, CheckRequest};
use std::io::Write;

use super::write_response;

pub fn run_check(request: &[u8], output: &mut impl Write) -> Result<()> {
    let req: CheckRequest =
        serde_json::from_slice(request).context("parsing request JSON")?;
    let versions = check::run(&req)?;
    write_response(output, &versions)
}
