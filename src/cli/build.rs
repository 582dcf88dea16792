//! Build subcommand: the production pipeline.
//!
//! Stage order matters: minifiers consume compiler output, and markup
//! rewriting only makes sense once the `.min` artifacts exist.

use anyhow::{Result, bail};

use crate::asset::{StageStatus, minify, rewrite, scripts, styles};
use crate::config::GantryConfig;
use crate::{core, log};

/// Run the full production pipeline. With `preview`, finish by serving
/// the output tree (blocking until Ctrl+C).
pub fn run_build(config: &GantryConfig, preview: bool) -> Result<()> {
    let started = std::time::Instant::now();

    // Compile stages write disjoint subtrees; same for the two minifiers.
    let (styles_result, scripts_result) = rayon::join(
        || styles::compile_styles(config),
        || scripts::transpile_script(config),
    );
    // Style syntax errors stay non-blocking: the broken file is skipped and
    // downstream stages run against whatever artifacts exist. A script parse
    // error aborts, there is only one entry and nothing left to bundle.
    if let StageStatus::CompletedWithErrors(n) = styles_result? {
        log!("styles"; "{} stylesheet(s) failed, continuing with remaining artifacts", n);
    }
    require_clean("scripts", scripts_result?)?;

    let (js_outcome, css_outcome) = rayon::join(
        || minify::minify_script(config),
        || minify::minify_styles(config),
    );
    js_outcome?;
    css_outcome?;

    match rewrite::rewrite_markup(config)? {
        StageStatus::Clean => {}
        StageStatus::CompletedWithErrors(n) => {
            log!("rewrite"; "{} page(s) failed, references not rewritten", n);
        }
    }

    log!("build"; "production build finished in {}ms", started.elapsed().as_millis());

    if preview {
        core::set_serving();
        let bound = super::serve::bind_server(config)?;
        return bound.run();
    }
    Ok(())
}

/// For stages whose output is all-or-nothing a failure aborts the build.
fn require_clean(stage: &str, status: StageStatus) -> Result<()> {
    match status {
        StageStatus::Clean => Ok(()),
        StageStatus::CompletedWithErrors(n) => {
            bail!("{stage}: {n} source file(s) failed to compile")
        }
    }
}
