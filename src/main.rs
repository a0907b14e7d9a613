mod cli;
mod commands;
mod config;
mod controller;
mod manifest;
mod paths;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: cli.config,
        manifest_path: cli.manifest,
    };

    match cli.command {
        Commands::Status { name } => commands::status::run(&ctx, name.as_deref()),
        Commands::Diff { name } => commands::diff::run(&ctx, name.as_deref()),
        Commands::Apply(args) => commands::apply::run(&ctx, args),
        Commands::Delete { name, yes } => commands::delete::run(&ctx, &name, yes),
        Commands::Config(cmd) => commands::config::run(&ctx, cmd),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "petsync", &mut io::stdout());
            Ok(())
        }
    }
}
