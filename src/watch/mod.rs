//! File watching for the dev server.
//!
//! A notify watcher feeds raw filesystem events into the actor, which
//! debounces them, classifies each changed path into a pipeline stage,
//! reruns the affected stages on the rayon pool, and pushes a reload to
//! connected browsers.
//!
//! ```text
//! notify --[events]--> WatchActor --[rebuild]--> rayon pool
//!                            \--[Reload]--> ReloadActor
//! ```

mod debouncer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, watch};

use crate::asset::{scripts, styles};
use crate::config::GantryConfig;
use crate::reload::ReloadMsg;
use crate::utils::path::display_rel;
use crate::{debug, log, logger};
use debouncer::{ChangeKind, Debouncer};

/// Pipeline stages a changed path can map to.
#[derive(Debug, Default, PartialEq, Eq)]
struct DirtyStages {
    styles: bool,
    scripts: bool,
}

impl DirtyStages {
    fn is_empty(&self) -> bool {
        !self.styles && !self.scripts
    }
}

/// File watch actor. Owns the debouncer and the stage dispatch.
pub struct WatchActor {
    config: Arc<GantryConfig>,
    event_rx: mpsc::Receiver<notify::Event>,
    reload_tx: mpsc::Sender<ReloadMsg>,
    shutdown_rx: watch::Receiver<bool>,
    debouncer: Debouncer,
    // Kept alive for the actor's lifetime; dropping it stops the watch.
    _watcher: notify::RecommendedWatcher,
}

impl WatchActor {
    /// Set up the filesystem watcher over both source roots.
    pub fn new(
        config: Arc<GantryConfig>,
        reload_tx: mpsc::Sender<ReloadMsg>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel(256);

        // The notify callback runs on the watcher's own thread, so a
        // blocking send into the actor channel is safe here.
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) => {
                        let _ = event_tx.blocking_send(event);
                    }
                    Err(e) => {
                        log!("watch"; "watcher error: {}", e);
                    }
                }
            })
            .context("failed to create filesystem watcher")?;

        for root in [config.styles_dir(), config.scripts_dir()] {
            if root.is_dir() {
                watcher
                    .watch(&root, RecursiveMode::Recursive)
                    .with_context(|| format!("failed to watch {}", root.display()))?;
                debug!("watch"; "watching {}", display_rel(&root, &config.root));
            } else {
                log!("watch"; "source dir missing, not watched: {}", root.display());
            }
        }

        Ok(Self {
            config,
            event_rx,
            reload_tx,
            shutdown_rx,
            debouncer: Debouncer::new(),
            _watcher: watcher,
        })
    }

    /// Run the actor event loop until shutdown.
    pub async fn run(mut self) {
        log!("watch"; "watching for changes (Ctrl+C to stop)");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    debug!("watch"; "shutting down");
                    break;
                }

                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => self.debouncer.add_event(&event),
                        None => break,
                    }
                }

                _ = tokio::time::sleep(self.debouncer.sleep_duration()) => {
                    if let Some(changes) = self.debouncer.take_if_ready() {
                        self.dispatch(changes);
                    }
                }
            }
        }
    }

    /// Classify the debounced change set and rerun the affected stages.
    fn dispatch(&self, changes: FxHashMap<PathBuf, ChangeKind>) {
        let stages = self.classify(&changes);
        if stages.is_empty() {
            return;
        }

        for (path, kind) in &changes {
            debug!("watch"; "{}: {}", kind.label(), display_rel(path, &self.config.root));
        }

        if stages.styles {
            self.spawn_stage("styles", styles::compile_styles);
        }
        if stages.scripts {
            self.spawn_stage("scripts", scripts::transpile_script);
        }
    }

    /// Map changed paths onto pipeline stages.
    fn classify(&self, changes: &FxHashMap<PathBuf, ChangeKind>) -> DirtyStages {
        let styles_dir = self.config.styles_dir();
        let scripts_dir = self.config.scripts_dir();

        let mut stages = DirtyStages::default();
        for path in changes.keys() {
            if is_style_source(path, &styles_dir) {
                stages.styles = true;
            } else if is_script_source(path, &scripts_dir) {
                stages.scripts = true;
            }
        }
        stages
    }

    /// Rerun one stage on the rayon pool, pushing a reload on success.
    ///
    /// Stage failures are reported on the status line and never tear down
    /// the watch loop; the next save gets another chance.
    fn spawn_stage(
        &self,
        stage: &'static str,
        run: fn(&GantryConfig) -> Result<crate::asset::StageStatus>,
    ) {
        let config = Arc::clone(&self.config);
        let reload_tx = self.reload_tx.clone();

        rayon::spawn(move || {
            let started = std::time::Instant::now();
            match run(&config) {
                Ok(status) => {
                    logger::status_success(&format!(
                        "rebuilt {} in {}ms{}",
                        stage,
                        started.elapsed().as_millis(),
                        match status {
                            crate::asset::StageStatus::Clean => String::new(),
                            crate::asset::StageStatus::CompletedWithErrors(n) =>
                                format!(" ({n} file(s) failed)"),
                        }
                    ));
                    let _ = reload_tx.blocking_send(ReloadMsg::Reload {
                        reason: stage.to_string(),
                    });
                }
                Err(e) => {
                    logger::status_error(&format!("{stage} rebuild failed"), &format!("{e:#}"));
                }
            }
        });
    }
}

/// A style source: any `*.css` under the styles dir.
fn is_style_source(path: &Path, styles_dir: &Path) -> bool {
    path.starts_with(styles_dir) && path.extension().is_some_and(|ext| ext == "css")
}

/// A script source: a top-level `*.js` in the scripts dir. Vendor files in
/// subdirectories bypass transpilation, so changes there are not rebuilds.
fn is_script_source(path: &Path, scripts_dir: &Path) -> bool {
    path.parent() == Some(scripts_dir) && path.extension().is_some_and(|ext| ext == "js")
}
