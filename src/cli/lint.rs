//! Lint subcommand.
//!
//! Style violations fail the task; script diagnostics are advisory.

use anyhow::Result;

use crate::config::GantryConfig;
use crate::lint::{lint_scripts, lint_styles};

pub fn run_lint(config: &GantryConfig) -> Result<()> {
    lint_styles(config)?;
    lint_scripts(config)
}
