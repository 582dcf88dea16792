//! Dev subcommand: compile once, then serve with watch and live reload.

use anyhow::Result;

use crate::asset::{StageStatus, scripts, styles};
use crate::config::GantryConfig;
use crate::{core, log};

/// Run the development pipeline and enter the serve loop (blocking).
pub fn run_dev(config: &GantryConfig) -> Result<()> {
    initial_compile(config)?;
    core::set_serving();

    let bound = super::serve::bind_server(config)?;
    bound.run()
}

/// The two compile stages write to disjoint output subtrees, so they run
/// in parallel. Per-file failures inside a stage are recoverable in dev
/// mode; only a stage that cannot run at all aborts startup.
fn initial_compile(config: &GantryConfig) -> Result<()> {
    let started = std::time::Instant::now();

    let (styles_result, scripts_result) = rayon::join(
        || styles::compile_styles(config),
        || scripts::transpile_script(config),
    );
    report_stage("styles", styles_result?);
    report_stage("scripts", scripts_result?);

    log!("build"; "compiled in {}ms", started.elapsed().as_millis());
    Ok(())
}

fn report_stage(stage: &str, status: StageStatus) {
    if let StageStatus::CompletedWithErrors(n) = status {
        log!(stage; "{} file(s) failed, artifacts missing or stale", n);
    }
}
