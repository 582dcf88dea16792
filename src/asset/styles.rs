//! Style Compiler stage.
//!
//! Compiles every style source in the flat source directory into one
//! browser-ready stylesheet plus a source map, lowering modern syntax and
//! adding vendor prefixes for the configured browser range.
//!
//! A syntax error in one source file is logged and skips that file only;
//! the stage itself never fails the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use parcel_sourcemap::SourceMap;

use super::{StageStatus, browser_targets};
use crate::config::GantryConfig;
use crate::{debug, log};

/// Compile all style sources into the output style directory.
pub fn compile_styles(config: &GantryConfig) -> Result<StageStatus> {
    let source_dir = config.styles_dir();
    let out_dir = config.output_styles_dir();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let sources = collect_flat_sources(&source_dir)?;
    let mut errors = 0usize;

    for source_path in &sources {
        match compile_one(source_path, &out_dir) {
            Ok(()) => {
                debug!("styles"; "compiled {}", source_path.display());
            }
            Err(e) => {
                // Recoverable: no artifact for this file, pipeline continues.
                log!("styles"; "error in {}: {:#}", source_path.display(), e);
                errors += 1;
            }
        }
    }

    log!("styles"; "compiled {}/{} stylesheets", sources.len() - errors, sources.len());
    Ok(StageStatus::from_error_count(errors))
}

/// Flat `*.css` glob over the style source directory, sorted for
/// deterministic output ordering.
fn collect_flat_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read style sources in {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "css"))
        .collect();
    sources.sort();
    Ok(sources)
}

/// Compile one stylesheet to `<out_dir>/<name>.css` + `<name>.css.map`.
fn compile_one(source_path: &Path, out_dir: &Path) -> Result<()> {
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;

    let file_name = source_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("stylesheet.css")
        .to_string();

    let stylesheet = StyleSheet::parse(
        &source,
        ParserOptions {
            filename: file_name.clone(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut source_map = SourceMap::new("/");
    source_map.add_source(&file_name);
    let _ = source_map.set_source_content(0, &source);

    let result = stylesheet
        .to_css(PrinterOptions {
            targets: browser_targets(),
            source_map: Some(&mut source_map),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let out_path = out_dir.join(&file_name);
    let map_name = format!("{file_name}.map");

    let code = format!("{}\n/*# sourceMappingURL={} */", result.code, map_name);
    fs::write(&out_path, code)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    let map_json = source_map
        .to_json(None)
        .map_err(|e| anyhow::anyhow!("source map: {e:?}"))?;
    fs::write(out_dir.join(&map_name), map_json)
        .with_context(|| format!("failed to write {map_name}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compile_fixture(files: &[(&str, &str)]) -> (TempDir, PathBuf, StageStatus) {
        let temp = TempDir::new().unwrap();
        let styles = temp.path().join("src/assets/css");
        fs::create_dir_all(&styles).unwrap();
        for (name, content) in files {
            fs::write(styles.join(name), content).unwrap();
        }

        let mut config = crate::config::GantryConfig::parse("").unwrap();
        config.root = temp.path().to_path_buf();
        let status = compile_styles(&config).unwrap();
        let out = config.output_styles_dir();
        (temp, out, status)
    }

    #[test]
    fn test_one_output_and_map_per_source() {
        let (_temp, out, status) = compile_fixture(&[
            ("main.css", "body { color: red; }"),
            ("extra.css", "h1 { margin: 0; }"),
        ]);

        assert_eq!(status, StageStatus::Clean);
        assert!(out.join("main.css").is_file());
        assert!(out.join("main.css.map").is_file());
        assert!(out.join("extra.css").is_file());
        assert!(out.join("extra.css.map").is_file());
    }

    #[test]
    fn test_output_references_its_source_map() {
        let (_temp, out, _) = compile_fixture(&[("main.css", "body { color: red; }")]);
        let compiled = fs::read_to_string(out.join("main.css")).unwrap();
        assert!(compiled.contains("sourceMappingURL=main.css.map"));
    }

    #[test]
    fn test_vendor_prefixes_for_target_range() {
        let (_temp, out, _) =
            compile_fixture(&[("main.css", ".box { user-select: none; }")]);
        let compiled = fs::read_to_string(out.join("main.css")).unwrap();
        // Safari 15.4 in the target range still needs the -webkit- prefix.
        assert!(compiled.contains("-webkit-user-select"));
    }

    #[test]
    fn test_syntax_error_skips_file_without_failing() {
        let (_temp, out, status) = compile_fixture(&[
            ("bad.css", "body { color: ; }}}"),
            ("good.css", "p { margin: 0; }"),
        ]);

        assert_eq!(status, StageStatus::CompletedWithErrors(1));
        assert!(!out.join("bad.css").exists());
        assert!(out.join("good.css").is_file());
    }
}
