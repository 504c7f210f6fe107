//! Handlers for the three resource commands.

mod check;
mod get;
mod put;

pub use check::run_check;
pub use get::run_get;
pub use put::run_put;

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

/// One JSON document per invocation, newline terminated.
fn write_response<T: Serialize>(output: &mut impl Write, response: &T) -> Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
