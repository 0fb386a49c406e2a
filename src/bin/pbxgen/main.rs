//! pbxgen CLI - generate and patch Xcode project manifests

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Flags shared by every subcommand.
pub struct GlobalOptions {
    pub verbose: bool,
    pub no_color: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("pbxgen=debug")
    } else {
        EnvFilter::new("pbxgen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let global_opts = GlobalOptions {
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &global_opts),
        Commands::Add(args) => commands::add::execute(args, &global_opts),
        Commands::Check(args) => commands::check::execute(args, &global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
