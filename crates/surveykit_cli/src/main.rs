//! `surveykit` command-line entry point.
//!
//! Parses arguments, sets up logging and dispatches to a subcommand.

mod cli_args;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Reformat(args) => commands::reformat::run(args),
        Commands::Verify(args) => commands::verify::run(args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
