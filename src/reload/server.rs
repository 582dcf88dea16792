//! WebSocket listener for live reload.
//!
//! Accepted connections are handed to the reload actor via channel; the
//! actor performs the handshake and owns the client afterwards.

use std::net::TcpListener;

use anyhow::Result;

use super::ReloadMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Start the WebSocket accept loop on a background thread.
///
/// Returns the actually-bound port, which may differ from `base_port`
/// when it was already in use.
pub fn start_ws_server_with_channel(
    base_port: u16,
    reload_tx: tokio::sync::mpsc::Sender<ReloadMsg>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);

                    // Set blocking for the WebSocket handshake
                    let _ = stream.set_nonblocking(false);

                    if reload_tx.blocking_send(ReloadMsg::AddClient(stream)).is_err() {
                        // Actor is gone; nothing left to accept for.
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if crate::core::is_shutdown() {
                        break;
                    }
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_retries_past_occupied_port() {
        let (first, first_port) = try_bind_port(0, 1).unwrap();
        // Port 0 asks the OS for an ephemeral port, so binding again at the
        // same base must still succeed via retry or a fresh ephemeral port.
        let result = try_bind_port(first_port, MAX_PORT_RETRIES);
        assert!(result.is_ok());
        drop(first);
    }
}
