//! a4e CLI - Eclipse workspace metadata for headless builds

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use ant4eclipse::resolver::ResolveError;
use ant4eclipse::util::diagnostic;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ResolveError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("ant4eclipse=debug")
    } else {
        EnvFilter::new("ant4eclipse=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let global = commands::GlobalArgs::from_cli(&cli)?;

    match cli.command {
        Commands::BuildOrder(args) => commands::build_order::execute(args, &global),
        Commands::Classpath(args) => commands::classpath::execute(args, &global),
        Commands::Info => commands::info::execute(&global),
    }
}
