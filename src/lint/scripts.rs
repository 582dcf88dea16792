//! Script linter.
//!
//! Parses every top-level script source and reports diagnostics on the
//! console. Advisory only: violations never fail the lint task.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use oxc::allocator::Allocator;
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::GantryConfig;
use crate::log;

/// Lint all top-level script sources. Always returns `Ok` - reported
/// diagnostics are advisory.
pub fn lint_scripts(config: &GantryConfig) -> Result<()> {
    let sources = collect_script_sources(&config.scripts_dir())?;

    let mut diagnostics = 0usize;
    for path in &sources {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        diagnostics += report_diagnostics(path, &source);
    }

    if diagnostics == 0 {
        log!("lint"; "scripts clean ({} files)", sources.len());
    } else {
        log!("lint"; "{} script diagnostic(s) (advisory)", diagnostics);
    }
    Ok(())
}

/// Top-level `*.js` files only - vendor subdirectories are not ours to lint.
fn collect_script_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut sources: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "js"))
        .collect();
    sources.sort();
    Ok(sources)
}

/// Print parser diagnostics for one file; returns how many were reported.
pub(crate) fn report_diagnostics(path: &Path, source: &str) -> usize {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();

    for error in &ret.errors {
        log!("lint"; "{}: {}", path.display(), error);
    }
    ret.errors.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_valid_source_reports_nothing() {
        assert_eq!(
            report_diagnostics(Path::new("app.js"), "const x = 1;"),
            0
        );
    }

    #[test]
    fn test_broken_source_reports_but_lint_still_passes() {
        let temp = TempDir::new().unwrap();
        let js_dir = temp.path().join("src/assets/js");
        fs::create_dir_all(&js_dir).unwrap();
        fs::write(js_dir.join("app.js"), "function ( {").unwrap();

        let mut config = crate::config::GantryConfig::parse("").unwrap();
        config.root = temp.path().to_path_buf();

        // Advisory: violations present, task still succeeds.
        assert!(lint_scripts(&config).is_ok());
    }

    #[test]
    fn test_vendor_subdirectories_are_skipped() {
        let temp = TempDir::new().unwrap();
        let js_dir = temp.path().join("js");
        fs::create_dir_all(js_dir.join("vendors")).unwrap();
        fs::write(js_dir.join("app.js"), "const a = 1;").unwrap();
        fs::write(js_dir.join("vendors/broken.js"), "function ( {").unwrap();

        let sources = collect_script_sources(&js_dir).unwrap();
        assert_eq!(sources.len(), 1);
        assert!(sources[0].ends_with("app.js"));
    }
}
