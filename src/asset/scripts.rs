//! Script Transpiler stage.
//!
//! Transpiles the single application entry script to the browser target.
//! No linting, no bundling - syntax lowering only.

use std::fs;

use anyhow::{Context, Result};
use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};

use super::StageStatus;
use crate::config::GantryConfig;
use crate::log;

/// Syntax level the transpiler lowers to.
const ES_TARGET: &str = "es2018";

/// Transpile the application entry script to the output script directory.
///
/// Parse errors are logged and leave no artifact; they do not fail the
/// enclosing pipeline.
pub fn transpile_script(config: &GantryConfig) -> Result<StageStatus> {
    let entry = config.script_entry();
    let source = fs::read_to_string(&entry)
        .with_context(|| format!("failed to read {}", entry.display()))?;

    let Some(code) = transpile(&source) else {
        log!("scripts"; "parse error in {}, no output written", entry.display());
        return Ok(StageStatus::CompletedWithErrors(1));
    };

    let out_dir = config.output_scripts_dir();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let out_path = config.transpiled_script();
    fs::write(&out_path, code)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    log!("scripts"; "transpiled {}", entry.display());
    Ok(StageStatus::Clean)
}

/// Lower source to the browser syntax target.
///
/// Returns `None` when the source does not parse; diagnostics are logged.
pub fn transpile(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();

    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        for error in &ret.errors {
            log!("scripts"; "{}", error);
        }
        return None;
    }

    let mut program = ret.program;
    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let options = match TransformOptions::from_target(ES_TARGET) {
        Ok(options) => options,
        Err(e) => {
            log!("scripts"; "invalid transform target: {}", e);
            return None;
        }
    };

    let ret = Transformer::new(&allocator, std::path::Path::new("app.js"), &options)
        .build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        for error in &ret.errors {
            log!("scripts"; "{}", error);
        }
        return None;
    }

    Some(Codegen::new().build(&program).code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_transpile_lowers_exponent_operator() {
        // ** is es2016; the target keeps it, but optional catch binding and
        // object spread (es2018+) must survive, so just check it emits.
        let code = transpile("const area = (r) => 3.14 * r ** 2;").unwrap();
        assert!(code.contains("area"));
    }

    #[test]
    fn test_transpile_rejects_syntax_errors() {
        assert!(transpile("const = broken(").is_none());
    }

    #[test]
    fn test_stage_writes_to_fixed_output_path() {
        let temp = TempDir::new().unwrap();
        let js_dir = temp.path().join("src/assets/js");
        fs::create_dir_all(&js_dir).unwrap();
        fs::write(js_dir.join("app.js"), "console.log('hi');").unwrap();

        let mut config = crate::config::GantryConfig::parse("").unwrap();
        config.root = temp.path().to_path_buf();

        let status = transpile_script(&config).unwrap();
        assert_eq!(status, StageStatus::Clean);
        assert!(config.transpiled_script().is_file());
    }

    #[test]
    fn test_stage_skips_output_on_parse_error() {
        let temp = TempDir::new().unwrap();
        let js_dir = temp.path().join("src/assets/js");
        fs::create_dir_all(&js_dir).unwrap();
        fs::write(js_dir.join("app.js"), "function ( {").unwrap();

        let mut config = crate::config::GantryConfig::parse("").unwrap();
        config.root = temp.path().to_path_buf();

        let status = transpile_script(&config).unwrap();
        assert_eq!(status, StageStatus::CompletedWithErrors(1));
        assert!(!config.transpiled_script().exists());
    }
}
