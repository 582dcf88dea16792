//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify the path stays under
    // serve_root, preventing traversal via symlinks or encoded sequences
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: decode, strip query string, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let decoded = percent_decode_str(url)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let path = decoded.split('?').next().unwrap_or(&decoded);
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_index_for_directory_url() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.html"), "<html></html>").unwrap();

        let resolved = resolve_path("/", temp.path()).unwrap();
        assert!(resolved.ends_with("index.html"));
    }

    #[test]
    fn test_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(resolve_path("/../etc/passwd", temp.path()).is_none());
        assert!(resolve_path("/%2e%2e/etc/passwd", temp.path()).is_none());
    }

    #[test]
    fn test_query_string_stripped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.min.js"), "x").unwrap();

        let resolved = resolve_path("/app.min.js?v=3", temp.path()).unwrap();
        assert!(resolved.ends_with("app.min.js"));
    }
}
