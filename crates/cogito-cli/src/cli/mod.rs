//! Entry point of the resource: dispatch on the invocation name.
//!
//! Concourse runs `/opt/resource/{check,in,out}`, all links to this binary.
//! It can also be run as `cogito <command> ...`.

mod commands;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cogito_core::logging;
use cogito_core::resource::peek_log_level;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use commands::{run_check, run_get, run_put};

/// Concourse resource reporting build status to GitHub commit statuses and Google Chat.
#[derive(Debug, Parser)]
#[command(name = "cogito", version)]
#[command(about = "Cogito: GitHub commit status resource for Concourse", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Report the (single, dummy) version.
    Check,

    /// Fetch: nothing to do, echo the version.
    In {
        /// Destination directory (unused).
        dest: PathBuf,
    },

    /// Publish the build state to the configured sinks.
    Out {
        /// Directory holding the step inputs, one of them the git repository.
        inputs: PathBuf,
    },
}

impl CliCommand {
    fn name(&self) -> &'static str {
        match self {
            CliCommand::Check => "check",
            CliCommand::In { .. } => "in",
            CliCommand::Out { .. } => "out",
        }
    }
}

/// Resolves the command from `argv[0]` (`check`, `in`, `out`) or, when
/// invoked as `cogito`, from the first argument.
pub fn parse_invocation(args: &[String]) -> Result<Cli> {
    let name = args
        .first()
        .and_then(|a| Path::new(a).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cli = match name.as_str() {
        "check" | "in" | "out" => {
            let argv = ["cogito".to_string(), name.clone()]
                .into_iter()
                .chain(args.iter().skip(1).cloned());
            Cli::try_parse_from(argv)?
        }
        "cogito" => Cli::try_parse_from(args)?,
        _ => bail!("cli: unknown command {:?} (argv: {:?})", name, args),
    };
    Ok(cli)
}

/// Runs one invocation: request JSON from `input`, response JSON to `output`.
pub fn run(args: &[String], input: &mut impl Read, output: &mut impl Write) -> Result<()> {
    let cli = parse_invocation(args)?;
    let command = cli.command.name();

    let mut request = Vec::new();
    input
        .read_to_end(&mut request)
        .with_context(|| format!("{}: reading request from stdin", command))?;

    logging::init_logging(peek_log_level(&request).as_deref());
    tracing::info!(command, version = env!("CARGO_PKG_VERSION"), "cogito started");

    let result = match cli.command {
        CliCommand::Check => run_check(&request, output),
        CliCommand::In { dest } => run_get(&request, &dest, output),
        CliCommand::Out { inputs } => run_put(&request, &inputs, output),
    };
    result.with_context(|| command.to_string())
}

#[cfg(test)]
mod tests;
