//! `[paths]` section configuration.
//!
//! The directory contract between pipeline stages. All paths are relative
//! to the project root (the directory holding gantry.toml).
//!
//! # Example
//!
//! ```toml
//! [paths]
//! styles = "src/assets/css"            # flat glob of style sources
//! script = "src/assets/js/app.js"      # the one application entry script
//! scripts = "src/assets/js"            # top-level script sources
//! vendor_styles = "src/assets/vendor/css"
//! output = "dist"
//! ```

use serde::Deserialize;
use std::path::PathBuf;

/// Source and output directory contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Style source directory (flat `*.css` glob).
    pub styles: PathBuf,

    /// Application script entry file.
    pub script: PathBuf,

    /// Script source directory (watched; linted at the top level).
    pub scripts: PathBuf,

    /// Vendor stylesheet directory, concatenated ahead of the app stylesheet.
    pub vendor_styles: PathBuf,

    /// Output tree root. Derived, fully regenerable.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            styles: PathBuf::from("src/assets/css"),
            script: PathBuf::from("src/assets/js/app.js"),
            scripts: PathBuf::from("src/assets/js"),
            vendor_styles: PathBuf::from("src/assets/vendor/css"),
            output: PathBuf::from("dist"),
        }
    }
}
