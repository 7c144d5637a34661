mod cli;
mod error;
mod progress;
mod submit;
mod ui;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "corrections=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = submit::execute(submit::SubmitArgs {
        config_path: cli.config,
        corrections_file: cli.file,
        continue_on_error: cli.continue_on_error,
        verbose: cli.verbose,
    });

    if let Err(err) = result {
        eprintln!("{} {}", "Error:".bold().red(), err.user_message());
        process::exit(1);
    }
}
