//! `[lint]` section configuration.
//!
//! Points at the style lint rule file. The rule file itself is a separate
//! TOML document (see `lint::styles::RuleFile`) so rule tweaks do not touch
//! the pipeline configuration.
//!
//! # Example
//!
//! ```toml
//! [lint]
//! style_rules = "lint.toml"
//! ```

use serde::Deserialize;
use std::path::PathBuf;

/// Style lint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LintSection {
    /// Rule-configuration file for the style linter, relative to the root.
    pub style_rules: PathBuf,
}

impl Default for LintSection {
    fn default() -> Self {
        Self {
            style_rules: PathBuf::from("lint.toml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_lint_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.lint.style_rules, PathBuf::from("lint.toml"));
    }

    #[test]
    fn test_lint_override() {
        let config = test_parse_config("[lint]\nstyle_rules = \".style-rules.toml\"");
        assert_eq!(config.lint.style_rules, PathBuf::from(".style-rules.toml"));
    }
}
