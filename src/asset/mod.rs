//! Pipeline stages that produce output-tree artifacts.
//!
//! Each stage consumes files from the source tree (or an earlier stage's
//! output) and writes to a disjoint subset of the output tree, so stages
//! composed in parallel never conflict.

pub mod minify;
pub mod rewrite;
pub mod scripts;
pub mod styles;

use lightningcss::targets::{Browsers, Targets};

/// Result of a stage whose per-file failures are recoverable.
///
/// Failures are logged at the point they occur; the count here exists so
/// callers (and tests) can observe them without parsing console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Every input produced its artifact.
    Clean,
    /// Some inputs failed; their artifacts are missing or stale.
    CompletedWithErrors(usize),
}

impl StageStatus {
    pub fn from_error_count(errors: usize) -> Self {
        if errors == 0 {
            Self::Clean
        } else {
            Self::CompletedWithErrors(errors)
        }
    }
}

/// Browser version encoded the way lightningcss expects.
const fn v(major: u32, minor: u32) -> u32 {
    (major << 16) | (minor << 8)
}

/// Browser support range for vendor prefixing and syntax lowering.
///
/// Roughly the last two major generations of the evergreen browsers.
pub(crate) fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(v(109, 0)),
        edge: Some(v(109, 0)),
        firefox: Some(v(102, 0)),
        safari: Some(v(15, 4)),
        ios_saf: Some(v(15, 4)),
        ..Browsers::default()
    })
}
