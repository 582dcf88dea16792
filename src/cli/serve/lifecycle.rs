//! Server lifecycle management.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Result;
use crossbeam::channel::Receiver;
use tiny_http::Server;

use crate::config::GantryConfig;
use crate::log;
use crate::reload::{ReloadActor, ReloadMsg, start_ws_server_with_channel};
use crate::watch::WatchActor;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Spawn the actor system for file watching and live reload.
///
/// Returns `None` when watching is disabled; the server then runs without
/// background actors.
pub fn spawn_actors(
    config: Arc<GantryConfig>,
    watch_enabled: bool,
    ws_port: Option<u16>,
    shutdown_rx: Receiver<()>,
) -> Option<JoinHandle<()>> {
    if !watch_enabled {
        return None;
    }
    let ws_port = ws_port?;

    Some(thread::spawn(move || {
        run_actor_system(config, ws_port, shutdown_rx);
    }))
}

fn run_actor_system(config: Arc<GantryConfig>, ws_port: u16, shutdown_rx: Receiver<()>) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .expect("Failed to create tokio runtime");

    rt.block_on(async move {
        let (reload_tx, reload_rx) = tokio::sync::mpsc::channel::<ReloadMsg>(64);
        let (shutdown_tx, shutdown_watch) = tokio::sync::watch::channel(false);

        match start_ws_server_with_channel(ws_port, reload_tx.clone()) {
            Ok(port) => super::set_actual_ws_port(port),
            Err(e) => {
                log!("reload"; "websocket server failed: {}", e);
                return;
            }
        }

        let reload_handle = tokio::spawn(ReloadActor::new(reload_rx).run());

        let watch_handle =
            match WatchActor::new(Arc::clone(&config), reload_tx.clone(), shutdown_watch) {
                Ok(actor) => Some(tokio::spawn(actor.run())),
                Err(e) => {
                    log!("watch"; "failed to start: {}", e);
                    None
                }
            };

        // Bridge the synchronous Ctrl+C channel into the async actors.
        tokio::task::spawn_blocking(move || {
            let _ = shutdown_rx.recv();
            let _ = shutdown_tx.send(true);
            let _ = reload_tx.blocking_send(ReloadMsg::Shutdown);
        });

        if let Some(handle) = watch_handle {
            let _ = handle.await;
        }
        let _ = reload_handle.await;
    });
}

/// Wait for the actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}
