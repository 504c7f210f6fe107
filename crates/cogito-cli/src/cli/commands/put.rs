//! `out`: publish the build state.

use anyhow::{Context, Result};
use cogito_core::config;
use cogito_core::resource::put::{self, PutContext};
use cogito_core::resource::{BuildEnv, PutRequest};
use std::io::Write;
use std::path::Path;

use super::write_response;

pub fn run_put(request: &[u8], inputs: &Path, output: &mut impl Write) -> Result<()> {
    let req: PutRequest =
        serde_json::from_slice(request).context("parsing request JSON")?;
    let cfg = config::load()?;
    let ctx = PutContext {
        inputs_dir: inputs.to_path_buf(),
        env: BuildEnv::from_env(),
        retry: cfg.retry_policy()?,
    };
    let response = put::run(req, &ctx)?;
    write_response(output, &response)
}
