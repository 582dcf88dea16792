//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Gantry front-end asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: gantry.toml)
    #[arg(short = 'C', long, default_value = "gantry.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile assets and serve them with watch + live reload
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Produce the production output tree (minified, rewritten markup)
    #[command(visible_alias = "b")]
    Build {
        /// Network interface to bind for the preview server
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number for the preview server
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching while previewing
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        /// Serve the output tree after building (default: true)
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        preview: Option<bool>,
    },

    /// Lint style and script sources
    #[command(visible_alias = "l")]
    Lint,
}

#[allow(unused)]
impl Cli {
    pub const fn is_dev(&self) -> bool {
        matches!(self.command, Commands::Dev { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_lint(&self) -> bool {
        matches!(self.command, Commands::Lint)
    }
}
