//! Command-line interface: argument parsing and subcommand entry points.

mod args;
mod build;
mod dev;
mod lint;
pub mod serve;

pub use args::{Cli, Commands};
pub use build::run_build;
pub use dev::run_dev;
pub use lint::run_lint;
