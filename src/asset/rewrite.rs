//! Reference Rewriter stage.
//!
//! Swaps the placeholder blocks in output markup for references to the
//! minified bundles:
//!
//! ```html
//! <!-- build:js -->
//!   ...anything here is replaced wholesale...
//! <!-- endbuild -->
//! ```
//!
//! If the markers are absent (a prior run already replaced them) the file
//! is left untouched. Running the production pipeline twice therefore
//! silently skips rewriting - restore the markers to rewrite again.

use std::fs;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use super::StageStatus;
use crate::config::{GantryConfig, RewriteConfig};
use crate::{debug, log};

static JS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s*build:js\s*-->.*?<!--\s*endbuild\s*-->")
        .expect("js block pattern must compile")
});

static CSS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s*build:css\s*-->.*?<!--\s*endbuild\s*-->")
        .expect("css block pattern must compile")
});

/// Rewrite every markup file directly under the output root.
///
/// A page that cannot be read or written back is logged and skipped; its
/// references stay unrewritten and the stage reports the count.
pub fn rewrite_markup(config: &GantryConfig) -> Result<StageStatus> {
    let output_dir = config.output_dir();
    let mut rewritten = 0usize;
    let mut skipped = 0usize;
    let mut errors = 0usize;

    let entries = fs::read_dir(&output_dir)
        .with_context(|| format!("failed to read {}", output_dir.display()))?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "html") {
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log!("rewrite"; "failed to read {}: {}", path.display(), e);
                errors += 1;
                continue;
            }
        };

        match rewrite_html(&content, &config.rewrite) {
            Some(updated) => match fs::write(&path, updated) {
                Ok(()) => rewritten += 1,
                Err(e) => {
                    log!("rewrite"; "failed to write {}: {}", path.display(), e);
                    errors += 1;
                }
            },
            None => {
                debug!("rewrite"; "no placeholder markers in {}", path.display());
                skipped += 1;
            }
        }
    }

    log!("rewrite"; "rewrote {} markup file(s), {} without markers", rewritten, skipped);
    Ok(StageStatus::from_error_count(errors))
}

/// Replace both placeholder blocks in one markup document.
///
/// Returns `None` when neither marker pair is present (no-op).
pub fn rewrite_html(content: &str, rewrite: &RewriteConfig) -> Option<String> {
    let has_js = JS_BLOCK.is_match(content);
    let has_css = CSS_BLOCK.is_match(content);
    if !has_js && !has_css {
        return None;
    }

    let mut updated = content.to_string();
    if has_js {
        let tags = script_tags(&rewrite.scripts);
        updated = JS_BLOCK.replace_all(&updated, tags.as_str()).into_owned();
    }
    if has_css {
        let tag = style_tag(&rewrite.style);
        updated = CSS_BLOCK.replace_all(&updated, tag.as_str()).into_owned();
    }
    Some(updated)
}

/// Ordered `<script>` tags: vendor libraries first, application script last.
fn script_tags(scripts: &[String]) -> String {
    scripts
        .iter()
        .map(|src| format!("<script src=\"{src}\"></script>"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn style_tag(href: &str) -> String {
    format!("<link rel=\"stylesheet\" href=\"{href}\">")
}
