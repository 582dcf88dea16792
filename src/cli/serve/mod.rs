//! Static file server with live reload support.

mod lifecycle;
mod path;
mod response;

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::config::{GantryConfig, cfg};
use crate::{debug, log};

/// Default WebSocket port for live reload
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Actual WebSocket port (may differ from DEFAULT_WS_PORT if port was in use)
/// Updated after the WebSocket server binds successfully
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(DEFAULT_WS_PORT);

/// Update the actual WebSocket port (called after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

/// Get the actual WebSocket port
fn get_actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    ws_port: Option<u16>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &GantryConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let ws_port = config.serve.watch.then_some(DEFAULT_WS_PORT);
    if ws_port.is_some() {
        debug!("reload"; "ws://localhost:{}", DEFAULT_WS_PORT);
    }

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        ws_port,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the request loop (blocking until shutdown).
    pub fn run(self) -> Result<()> {
        let config = cfg();
        let actor_handle = lifecycle::spawn_actors(
            Arc::clone(&config),
            config.serve.watch,
            self.ws_port,
            self.shutdown_rx,
        );
        run_request_loop(&self.server);
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server) {
    let config = cfg();
    // Thread pool so a slow read never blocks other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &GantryConfig) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    // Serve livereload.js from memory; use the actual ws port, which may
    // differ from DEFAULT_WS_PORT after retry
    let ws_port = config.serve.watch.then(get_actual_ws_port);
    if ws_port.is_some() && request.url() == crate::embed::LIVERELOAD_JS.url_path() {
        return response::respond_livereload_js(request, get_actual_ws_port());
    }

    if !crate::core::is_serving() {
        return response::respond_not_ready(request);
    }

    if let Some(file) = path::resolve_path(request.url(), &config.output_dir()) {
        return response::respond_file(request, &file, ws_port);
    }

    response::respond_not_found(request, config, ws_port)
}
