//! Style linter.
//!
//! Reads every style source (recursively), applies the rule file named in
//! `[lint] style_rules`, and fails the lint task on any violation.
//!
//! Rule definitions are deliberately minimal: syntax validity plus a small
//! set of toggleable conventions. Rule engines are out of scope here.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use regex::Regex;
use serde::Deserialize;

use super::Violation;
use crate::config::GantryConfig;
use crate::log;

/// Rule-configuration file schema (`lint.toml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleFile {
    /// Forbid `!important`.
    pub no_important: bool,
    /// Forbid id selectors (`#header { ... }`).
    pub no_id_selectors: bool,
    /// Maximum selector nesting depth; 0 disables the check.
    pub max_nesting_depth: usize,
}

impl Default for RuleFile {
    fn default() -> Self {
        Self {
            no_important: true,
            no_id_selectors: false,
            max_nesting_depth: 4,
        }
    }
}

impl RuleFile {
    /// Load the named rule file; a missing file means default rules.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid rule file {}", path.display()))
    }
}

/// Lint all style sources. Any violation fails the task.
pub fn lint_styles(config: &GantryConfig) -> Result<()> {
    let rules = RuleFile::load(&config.lint_rules_path())?;
    let sources = collect_style_sources(&config.styles_dir());

    let mut violations = Vec::new();
    for path in &sources {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        check_source(path, &source, &rules, &mut violations);
    }

    for violation in &violations {
        log!("lint"; "{}", violation);
    }

    if violations.is_empty() {
        log!("lint"; "styles clean ({} files)", sources.len());
        Ok(())
    } else {
        bail!(
            "style lint failed: {} violation(s) in {} file(s)",
            violations.len(),
            sources.len()
        )
    }
}

/// All style sources under the source dir, recursively.
fn collect_style_sources(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    jwalk::WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "css"))
        .collect()
}

static IMPORTANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\s*important\b").expect("important pattern must compile"));

// An id selector at rule position: start of line or after a combinator or
// comma, then `#name`. Hex colors live inside declarations and never match.
static ID_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#[a-zA-Z][\w-]*[^;\n]*\{")
        .expect("id selector pattern must compile")
});

/// Apply every enabled rule to one source file.
pub(crate) fn check_source(
    path: &Path,
    source: &str,
    rules: &RuleFile,
    violations: &mut Vec<Violation>,
) {
    // Syntax validity is always checked.
    if let Err(e) = StyleSheet::parse(source, ParserOptions::default()) {
        violations.push(Violation {
            path: path.to_path_buf(),
            rule: "syntax",
            message: e.to_string(),
        });
        // Remaining rules are textual and still meaningful; keep going.
    }

    if rules.no_important && IMPORTANT.is_match(source) {
        violations.push(Violation {
            path: path.to_path_buf(),
            rule: "no_important",
            message: "declaration uses !important".to_string(),
        });
    }

    if rules.no_id_selectors && ID_SELECTOR.is_match(source) {
        violations.push(Violation {
            path: path.to_path_buf(),
            rule: "no_id_selectors",
            message: "id selector used".to_string(),
        });
    }

    if rules.max_nesting_depth > 0 {
        let depth = max_brace_depth(source);
        if depth > rules.max_nesting_depth {
            violations.push(Violation {
                path: path.to_path_buf(),
                rule: "max_nesting_depth",
                message: format!(
                    "nesting depth {} exceeds limit {}",
                    depth, rules.max_nesting_depth
                ),
            });
        }
    }
}

/// Deepest brace nesting in the source.
fn max_brace_depth(source: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    for c in source.chars() {
        match c {
            '{' => {
                depth += 1;
                max = max.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str, rules: &RuleFile) -> Vec<Violation> {
        let mut violations = Vec::new();
        check_source(Path::new("main.css"), source, rules, &mut violations);
        violations
    }

    #[test]
    fn test_clean_source_has_no_violations() {
        let violations = check("body { color: red; }", &RuleFile::default());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_important_flagged() {
        let violations = check("p { color: red !important; }", &RuleFile::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "no_important");
    }

    #[test]
    fn test_syntax_error_flagged() {
        let violations = check("p { color }}", &RuleFile::default());
        assert!(violations.iter().any(|v| v.rule == "syntax"));
    }

    #[test]
    fn test_id_selector_rule_opt_in() {
        let source = "#header { color: red; }";
        assert!(check(source, &RuleFile::default()).is_empty());

        let rules = RuleFile {
            no_id_selectors: true,
            ..RuleFile::default()
        };
        let violations = check(source, &rules);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "no_id_selectors");
    }

    #[test]
    fn test_hex_color_is_not_an_id_selector() {
        let rules = RuleFile {
            no_id_selectors: true,
            ..RuleFile::default()
        };
        assert!(check("p { color: #fff; }", &rules).is_empty());
    }

    #[test]
    fn test_nesting_depth_limit() {
        let rules = RuleFile {
            max_nesting_depth: 2,
            ..RuleFile::default()
        };
        let nested = "@media screen { .a { .b { color: red; } } }";
        let violations = check(nested, &rules);
        assert!(violations.iter().any(|v| v.rule == "max_nesting_depth"));
    }

    #[test]
    fn test_missing_rule_file_uses_defaults() {
        let rules = RuleFile::load(Path::new("/nonexistent/lint.toml")).unwrap();
        assert!(rules.no_important);
    }
}
