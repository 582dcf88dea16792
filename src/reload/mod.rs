//! Live reload over WebSocket.
//!
//! Browser clients connect to a dedicated WebSocket port; when a watched
//! stage finishes rebuilding, every connected client is told to reload.
//!
//! ```text
//! WatchActor --[Reload]--> ReloadActor --[broadcast]--> Clients
//! ```

mod server;

pub use server::start_ws_server_with_channel;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::{debug, log};

/// Messages handled by the reload actor.
pub enum ReloadMsg {
    /// New browser connection (pre-handshake TCP stream).
    AddClient(TcpStream),
    /// Push a reload to all connected clients.
    Reload { reason: String },
    /// Close all connections and stop.
    Shutdown,
}

/// Wire format sent to browser clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    /// Connection established.
    Connected { version: String },
    /// Full page reload.
    Reload { reason: String },
}

impl WireMessage {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"type\":\"reload\"}".to_string())
    }
}

/// Reload actor - owns the client registry and broadcasts to it.
pub struct ReloadActor {
    rx: mpsc::Receiver<ReloadMsg>,
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl ReloadActor {
    pub fn new(rx: mpsc::Receiver<ReloadMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                ReloadMsg::AddClient(stream) => self.add_client(stream),
                ReloadMsg::Reload { reason } => {
                    debug!("reload"; "pushing reload: {}", reason);
                    self.broadcast(Message::Text(
                        WireMessage::Reload { reason }.to_json().into(),
                    ));
                }
                ReloadMsg::Shutdown => {
                    debug!("reload"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut client in clients.drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Accept a new client connection and greet it.
    fn add_client(&self, stream: TcpStream) {
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let connected = WireMessage::Connected {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                };
                if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                    log!("reload"; "failed to greet client: {}", e);
                    return;
                }
                // Non-blocking so a stalled client cannot wedge a broadcast.
                let _ = ws.get_ref().set_nonblocking(true);

                let mut clients = self.clients.lock();
                debug!("reload"; "client connected (total: {})", clients.len() + 1);
                clients.push(ws);
            }
            Err(e) => {
                log!("reload"; "handshake failed: {}", e);
            }
        }
    }

    /// Broadcast a message to all connected clients, dropping dead ones.
    fn broadcast(&self, msg: Message) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            debug!("reload"; "no clients connected");
            return;
        }

        clients.retain_mut(|client| match client.send(msg.clone()) {
            Ok(_) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        debug!("reload"; "broadcast to {} clients", count);
    }
}
