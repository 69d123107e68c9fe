//! xzpack CLI - build and package liblzma

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use xzpack::util::diagnostic;
use xzpack::PackageError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<PackageError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("xzpack=debug")
    } else {
        EnvFilter::new("xzpack=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let global = commands::GlobalArgs {
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::Plan(args) => commands::plan::execute(args, &global),
        Commands::Info(args) => commands::info::execute(args, &global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
