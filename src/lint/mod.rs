//! Source validation stages. No output artifacts.
//!
//! The asymmetry is deliberate: style violations fail the lint task,
//! script diagnostics are advisory and never do.

pub mod scripts;
pub mod styles;

pub use scripts::lint_scripts;
pub use styles::lint_styles;

use std::path::PathBuf;

/// One reported rule violation.
#[derive(Debug, Clone)]
pub struct Violation {
    pub path: PathBuf,
    pub rule: &'static str,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: [{}] {}",
            self.path.display(),
            self.rule,
            self.message
        )
    }
}
