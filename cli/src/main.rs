#![deny(missing_docs)]

//! # Spec IR CLI
//!
//! Command Line Interface over `spec-ir-core`.
//!
//! Supported Commands:
//! - `convert`: OpenAPI document -> resolved model (JSON or dump).

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod convert;
mod error;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI -> client model converter")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Converts an OpenAPI document into the resolved client model.
    Convert(convert::ConvertArgs),
}

/// `RUST_LOG` wins; otherwise `info` when verbose and `warn` when not.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Convert(args) => {
            init_tracing(args.verbose);
            convert::execute(args)?;
        }
    }

    Ok(())
}
