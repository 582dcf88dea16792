//! Gantry - a front-end asset pipeline.
//!
//! Compiles stylesheets and scripts into an output tree, lints sources,
//! minifies for production, rewrites markup references, and serves the
//! result with file watching and live reload.

mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod lint;
mod logger;
mod reload;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{GantryConfig, init_config};

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

    let config = init_config(GantryConfig::load(&cli)?);

    match &cli.command {
        Commands::Dev { .. } => cli::run_dev(&config),
        Commands::Build { preview, .. } => cli::run_build(&config, preview.unwrap_or(true)),
        Commands::Lint => cli::run_lint(&config),
    }
}
