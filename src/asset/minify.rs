//! Script and Style Minifier stages.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.
//!
//! Minification failures are a named, recoverable outcome rather than an
//! error: the enclosing pipeline logs them and continues, so a failed
//! minify leaves the previous (or no) artifact in place downstream.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use parcel_sourcemap::SourceMap;
use regex::Regex;

use super::browser_targets;
use crate::config::GantryConfig;
use crate::{debug, log};

/// Explicit result of a minifier stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinifyOutcome {
    /// Artifact written at the given path.
    Written(PathBuf),
    /// Recoverable failure; logged, no artifact produced.
    Failed { reason: String },
}

impl MinifyOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Script Minifier
// ============================================================================

/// Code blocks marked for removal in production builds:
/// `//removeIf(production)` ... `//endRemoveIf(production)`.
static PRODUCTION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)//[ \t]*removeIf\(production\).*?//[ \t]*endRemoveIf\(production\)[^\n]*")
        .expect("production block pattern must compile")
});

/// Strip debug-only code blocks (production flag fixed true).
pub fn strip_production_blocks(source: &str) -> String {
    PRODUCTION_BLOCK.replace_all(source, "").into_owned()
}

/// Minify the already-transpiled application script.
///
/// Steps: strip production-removal blocks, minify, write the `.min` variant.
/// A missing input or a minify failure is logged and swallowed.
pub fn minify_script(config: &GantryConfig) -> Result<MinifyOutcome> {
    let input = config.transpiled_script();
    let source = match fs::read_to_string(&input) {
        Ok(source) => source,
        Err(e) => {
            let outcome = MinifyOutcome::failed(format!("read {}: {}", input.display(), e));
            log_outcome("scripts", &outcome);
            return Ok(outcome);
        }
    };

    let stripped = strip_production_blocks(&source);
    let Some(code) = minify_js(&stripped) else {
        let outcome = MinifyOutcome::failed(format!("minify {} failed", input.display()));
        log_outcome("scripts", &outcome);
        return Ok(outcome);
    };

    let out_path = min_variant(&input);
    fs::write(&out_path, code)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    log!("scripts"; "minified {}", out_path.display());
    Ok(MinifyOutcome::Written(out_path))
}

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

// ============================================================================
// Style Minifier
// ============================================================================

/// Concatenate vendor stylesheets plus the compiled application stylesheet,
/// minify the whole, and write the `.min` variant with a source map.
///
/// Concatenation order is significant: vendor rules come first so the
/// application stylesheet wins ties by standard cascade source order.
pub fn minify_styles(config: &GantryConfig) -> Result<MinifyOutcome> {
    let mut inputs = collect_vendor_styles(&config.vendor_styles_dir());
    inputs.push(config.app_stylesheet());

    let mut concatenated = String::new();
    let mut source_map = SourceMap::new("/");
    for (index, path) in inputs.iter().enumerate() {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                let outcome =
                    MinifyOutcome::failed(format!("read {}: {}", path.display(), e));
                log_outcome("styles", &outcome);
                return Ok(outcome);
            }
        };
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("css");
        source_map.add_source(name);
        let _ = source_map.set_source_content(index, &source);
        concatenated.push_str(&source);
        concatenated.push('\n');
    }
    debug!("styles"; "concatenated {} stylesheets", inputs.len());

    let out_path = min_variant(&config.app_stylesheet());
    let map_name = format!(
        "{}.map",
        out_path.file_name().and_then(|n| n.to_str()).unwrap_or("main.min.css")
    );

    let code = match minify_css_mapped(&concatenated, &mut source_map) {
        Some(code) => code,
        None => {
            let outcome = MinifyOutcome::failed("stylesheet concatenation failed to minify");
            log_outcome("styles", &outcome);
            return Ok(outcome);
        }
    };

    fs::write(
        &out_path,
        format!("{code}\n/*# sourceMappingURL={map_name} */"),
    )
    .with_context(|| format!("failed to write {}", out_path.display()))?;

    if let Ok(map_json) = source_map.to_json(None) {
        fs::write(out_path.with_file_name(&map_name), map_json)
            .with_context(|| format!("failed to write {map_name}"))?;
    }

    log!("styles"; "minified {}", out_path.display());
    Ok(MinifyOutcome::Written(out_path))
}

/// Minify CSS source code (no source map).
pub fn minify_css(source: &str) -> Option<String> {
    let mut stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    stylesheet
        .minify(MinifyOptions {
            targets: browser_targets(),
            ..MinifyOptions::default()
        })
        .ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets: browser_targets(),
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// Minify CSS while recording mappings into the caller's source map.
fn minify_css_mapped(source: &str, source_map: &mut SourceMap) -> Option<String> {
    let mut stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    stylesheet
        .minify(MinifyOptions {
            targets: browser_targets(),
            ..MinifyOptions::default()
        })
        .ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets: browser_targets(),
            source_map: Some(source_map),
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

// ============================================================================
// Helpers
// ============================================================================

/// Vendor stylesheets in discovery order (recursive walk, sorted).
fn collect_vendor_styles(dir: &Path) -> Vec<PathBuf> {
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

/// `name.ext` -> `name.min.ext` beside the input.
fn min_variant(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    path.with_file_name(format!("{stem}.min.{ext}"))
}

fn log_outcome(module: &str, outcome: &MinifyOutcome) {
    if let MinifyOutcome::Failed { reason } = outcome {
        log!(module; "minify failed (continuing): {}", reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_min_variant_naming() {
        assert_eq!(
            min_variant(Path::new("/d/app.js")),
            PathBuf::from("/d/app.min.js")
        );
        assert_eq!(
            min_variant(Path::new("/d/main.css")),
            PathBuf::from("/d/main.min.css")
        );
    }

    #[test]
    fn test_strip_production_blocks() {
        let source = "let a = 1;\n//removeIf(production)\nconsole.log(a);\n//endRemoveIf(production)\nlet b = 2;\n";
        let stripped = strip_production_blocks(source);
        assert!(!stripped.contains("console.log"));
        assert!(stripped.contains("let a = 1;"));
        assert!(stripped.contains("let b = 2;"));
    }

    #[test]
    fn test_strip_is_noop_without_markers() {
        let source = "const x = 1;\n";
        assert_eq!(strip_production_blocks(source), source);
    }

    #[test]
    fn test_minify_js() {
        let code = minify_js("const answer = 40 + 2; console.log(answer);").unwrap();
        assert!(code.len() < "const answer = 40 + 2; console.log(answer);".len());
    }

    #[test]
    fn test_minify_js_rejects_broken_source() {
        assert!(minify_js("function ( {").is_none());
    }

    #[test]
    fn test_minify_css() {
        let code = minify_css("body {  color: #ff0000;  }").unwrap();
        assert!(code.contains("red") || code.contains("#f00"));
    }

    #[test]
    fn test_script_minify_failure_is_swallowed() {
        let temp = TempDir::new().unwrap();
        let mut config = crate::config::GantryConfig::parse("").unwrap();
        config.root = temp.path().to_path_buf();
        // No transpiled script exists: stage reports Failed, does not error.
        let outcome = minify_script(&config).unwrap();
        assert!(matches!(outcome, MinifyOutcome::Failed { .. }));
    }

    #[test]
    fn test_style_minifier_app_rules_win_by_order() {
        let temp = TempDir::new().unwrap();
        let mut config = crate::config::GantryConfig::parse("").unwrap();
        config.root = temp.path().to_path_buf();

        let vendor = config.vendor_styles_dir();
        fs::create_dir_all(&vendor).unwrap();
        fs::write(vendor.join("vendor.css"), "h1 { color: blue; }").unwrap();

        fs::create_dir_all(config.output_styles_dir()).unwrap();
        fs::write(config.app_stylesheet(), "h1 { color: green; }").unwrap();

        let outcome = minify_styles(&config).unwrap();
        let MinifyOutcome::Written(out_path) = outcome else {
            panic!("expected written artifact");
        };

        let minified = fs::read_to_string(&out_path).unwrap();
        // Same selector, same specificity: the app rule (last input) wins.
        let blue = minified.find("blue").or_else(|| minified.find("#00f"));
        let green = minified.find("green").or_else(|| minified.find("#008000"));
        match (blue, green) {
            // Rule merging may drop the overridden vendor declaration entirely.
            (Some(b), Some(g)) => assert!(b < g, "vendor rules must precede app rules"),
            (None, Some(_)) => {}
            _ => panic!("application rule missing from {minified}"),
        }
    }

    #[test]
    fn test_style_minifier_writes_min_variant_and_map() {
        let temp = TempDir::new().unwrap();
        let mut config = crate::config::GantryConfig::parse("").unwrap();
        config.root = temp.path().to_path_buf();

        fs::create_dir_all(config.output_styles_dir()).unwrap();
        fs::write(config.app_stylesheet(), "p { margin: 0px; }").unwrap();

        let outcome = minify_styles(&config).unwrap();
        assert!(matches!(outcome, MinifyOutcome::Written(_)));

        let out_dir = config.output_styles_dir();
        assert!(out_dir.join("main.min.css").is_file());
        assert!(out_dir.join("main.min.css.map").is_file());
    }
}
