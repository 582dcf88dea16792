//! `[rewrite]` section configuration.
//!
//! The Reference Rewriter replaces placeholder blocks in output markup with
//! these lists. Order is significant: vendor scripts load before the
//! application script, mirroring the cascade ordering of the style bundle.
//!
//! # Example
//!
//! ```toml
//! [rewrite]
//! scripts = ["assets/js/vendors/jquery.min.js", "assets/js/app.js"]
//! style = "assets/css/main.min.css"
//! ```

use serde::Deserialize;

/// Markup reference rewriting lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Ordered script references: vendor libraries first, then the app script.
    pub scripts: Vec<String>,

    /// The single minified stylesheet reference.
    pub style: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            scripts: [
                "assets/js/vendors/jquery.min.js",
                "assets/js/vendors/popper.min.js",
                "assets/js/vendors/bootstrap.min.js",
                "assets/js/vendors/easing.min.js",
                "assets/js/vendors/swiper.min.js",
                "assets/js/vendors/massonry.min.js",
                "assets/js/vendor/bootstrap-slider.js",
                "assets/js/vendor/magnific-popup.js",
                "assets/js/vendor/waypoints.js",
                "assets/js/vendor/counterup.js",
                "assets/js/vendor/isotop.pkgd.min.js",
                "assets/js/app.js",
            ]
            .map(String::from)
            .to_vec(),
            style: "assets/css/main.min.css".to_string(),
        }
    }
}
