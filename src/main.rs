//! Fern - build, watch and test runner for the browser extension.

mod builder;
mod cli;
mod config;
mod coordinator;
mod core;
mod logger;
mod notifier;
mod supervisor;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::FernConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let load = || FernConfig::load(&cli);

    match &cli.command {
        Commands::TestWebext => cli::webext::test_webext(&load()?),
        Commands::Build => cli::build::build_once(&load()?),
        Commands::AddonId { .. } => {
            println!("{}", load()?.settings.addon_id());
            Ok(())
        }
        Commands::Generate { kind, name } => {
            let root = std::env::current_dir()?;
            cli::generate::generate(&root, kind, name).map(drop)
        }
        Commands::ReactDev { .. } => cli::react_dev::react_dev(&load()?),
    }
}
