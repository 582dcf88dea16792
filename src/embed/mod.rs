//! Assets embedded into the binary at compile time.
//!
//! The livereload client script is minified by `build.rs` and served from
//! memory by the dev server, so the output tree never contains it.

use std::marker::PhantomData;

/// Trait for template variable sets.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Embedded asset with typed variable injection.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedAsset<V> {
    /// URL path the dev server answers for this asset.
    url_path: &'static str,
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> EmbeddedAsset<V> {
    pub const fn new(url_path: &'static str, content: &'static str) -> Self {
        Self {
            url_path,
            content,
            _marker: PhantomData,
        }
    }

    pub const fn url_path(&self) -> &'static str {
        self.url_path
    }
}

impl<V: TemplateVars> EmbeddedAsset<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }

    /// `<script src=...>` tag referencing the asset's serve URL.
    pub fn external_tag(&self) -> String {
        format!("<script src=\"{}\"></script>", self.url_path)
    }
}

/// Variables for livereload.js.
pub struct LivereloadVars {
    pub ws_port: u16,
}

impl TemplateVars for LivereloadVars {
    fn apply(&self, content: &str) -> String {
        content.replace("__GANTRY_WS_PORT__", &self.ws_port.to_string())
    }
}

/// Live reload client with WebSocket port injection.
pub const LIVERELOAD_JS: EmbeddedAsset<LivereloadVars> = EmbeddedAsset::new(
    "/__gantry/livereload.js",
    include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js")),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livereload_port_injection() {
        let rendered = LIVERELOAD_JS.render(&LivereloadVars { ws_port: 35729 });
        assert!(rendered.contains("35729"));
        assert!(!rendered.contains("__GANTRY_WS_PORT__"));
    }

    #[test]
    fn test_external_tag_points_at_serve_url() {
        let tag = LIVERELOAD_JS.external_tag();
        assert!(tag.starts_with("<script src=\"/__gantry/"));
    }
}
