//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::config::GantryConfig;
use crate::embed::{LIVERELOAD_JS, LivereloadVars};
use crate::utils::mime;
use crate::utils::mime::types::{HTML, JAVASCRIPT, PLAIN};

/// Respond with a static file, injecting the livereload script into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_livereload(body, content_type, ws_port);

    send_body(request, 200, content_type, body)
}

/// Respond with 404 page (custom or default).
pub fn respond_not_found(
    request: Request,
    config: &GantryConfig,
    ws_port: Option<u16>,
) -> Result<()> {
    let custom_404 = config.output_dir().join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let mime = if has_custom { HTML } else { PLAIN };
        return send_head(request, 404, mime);
    }

    if has_custom
        && let Ok(body) = fs::read(&custom_404)
    {
        let body = maybe_inject_livereload(body, HTML, ws_port);
        return send_body(request, 404, HTML, body);
    }

    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 while the initial pipeline run is still going.
pub fn respond_not_ready(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 pipeline running, retry shortly".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with livereload.js from memory.
pub fn respond_livereload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = LIVERELOAD_JS.render(&LivereloadVars { ws_port });
    send_body(request, 200, JAVASCRIPT, body.into_bytes())
}

/// Inject the livereload script tag into HTML bodies when watching.
///
/// Insertion point is the final `</body>`; a page without one gets the
/// tag appended, which browsers still execute.
fn maybe_inject_livereload(
    body: Vec<u8>,
    content_type: &'static str,
    ws_port: Option<u16>,
) -> Vec<u8> {
    if ws_port.is_none() || content_type != HTML {
        return body;
    }

    let html = match String::from_utf8(body) {
        Ok(html) => html,
        Err(e) => return e.into_bytes(),
    };
    let tag = LIVERELOAD_JS.external_tag();

    let injected = match html.to_ascii_lowercase().rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..pos]);
            out.push_str(&tag);
            out.push_str(&html[pos..]);
            out
        }
        None => {
            let mut out = html;
            out.push_str(&tag);
            out
        }
    };
    injected.into_bytes()
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response =
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_closing_body() {
        let html = b"<html><body><p>hi</p></body></html>".to_vec();
        let out = maybe_inject_livereload(html, HTML, Some(35729));
        let out = String::from_utf8(out).unwrap();

        let tag_pos = out.find("<script src=\"/__gantry/").unwrap();
        let body_pos = out.find("</body>").unwrap();
        assert!(tag_pos < body_pos);
    }

    #[test]
    fn test_inject_appends_without_closing_body() {
        let html = b"<p>fragment</p>".to_vec();
        let out = maybe_inject_livereload(html, HTML, Some(35729));
        assert!(String::from_utf8(out).unwrap().ends_with("</script>"));
    }

    #[test]
    fn test_no_injection_without_watch() {
        let html = b"<html><body></body></html>".to_vec();
        let out = maybe_inject_livereload(html.clone(), HTML, None);
        assert_eq!(out, html);
    }

    #[test]
    fn test_no_injection_into_non_html() {
        let css = b"body { color: red; }".to_vec();
        let out = maybe_inject_livereload(css.clone(), crate::utils::mime::types::CSS, Some(35729));
        assert_eq!(out, css);
    }
}
