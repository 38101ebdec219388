use anyhow::Context;
use clap::Parser;
use log::{debug, error, LevelFilter};
use matterfix::MatterFixError;
use std::process::ExitCode;

mod cli_bin;

use cli_bin::args::{Cli, Commands};
use cli_bin::commands::{check_command, fix_command, validate_command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Fix(args) => fix_command(args).context("fix failed"),
        Commands::Check(args) => check_command(args).context("check failed"),
        Commands::Validate(args) => validate_command(args).context("validate failed"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(cause) = e.downcast_ref::<MatterFixError>() {
                debug!("severity: {}", cause.severity());
            }
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Default level from the flags; RUST_LOG overrides it
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}
