//! WebSocket fan-out server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use plantsight_common::{ECHO_REPLY_PREFIX, IMAGE_FRAME_PREFIX};

/// Errors that can occur in the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Failed to bind the listen address. Fatal at startup.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the accept loop.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registry of live connections.
///
/// Mutated only by the relay's own accept/drop logic. Outbound frames
/// go through each connection's unbounded queue so broadcasting never
/// awaits a peer; external readers use [`viewer_count`].
///
/// [`viewer_count`]: ConnectionRegistry::viewer_count
struct ConnectionRegistry {
    connections: Mutex<HashMap<u64, mpsc::UnboundedSender<Message>>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn register(&self) -> (u64, mpsc::UnboundedReceiver<Message>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.lock().insert(id, tx);
        (id, rx)
    }

    fn remove(&self, id: u64) {
        self.connections.lock().remove(&id);
    }

    fn viewer_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Queue a frame to every connection except the sender.
    ///
    /// A connection whose queue is gone is evicted; the rest still get
    /// the frame. Returns the number of connections reached.
    fn broadcast_from(&self, sender_id: u64, message: &Message) -> usize {
        let mut connections = self.connections.lock();
        let mut dead = Vec::new();
        let mut reached = 0;

        for (&id, tx) in connections.iter() {
            if id == sender_id {
                continue;
            }
            if tx.send(message.clone()).is_ok() {
                reached += 1;
            } else {
                dead.push(id);
            }
        }

        for id in dead {
            connections.remove(&id);
        }

        reached
    }

    /// Queue a frame to one connection only.
    fn send_to(&self, id: u64, message: Message) {
        let connections = self.connections.lock();
        if let Some(tx) = connections.get(&id) {
            let _ = tx.send(message);
        }
    }
}

/// The snapshot relay server.
pub struct RelayServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
}

impl RelayServer {
    /// Bind the listen address. The only fatal error in the relay.
    pub async fn bind(addr: &str) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| RelayError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            registry: Arc::new(ConnectionRegistry::new()),
        })
    }

    /// The address the relay is actually listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of currently connected peers.
    pub fn viewer_count(&self) -> usize {
        self.registry.viewer_count()
    }

    /// Run the accept loop until the shutdown signal flips.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), RelayError> {
        info!(addr = %self.local_addr, "Snapshot relay listening");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signal received, stopping relay");
                        break;
                    }
                }

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let registry = self.registry.clone();
                            tokio::spawn(async move {
                                handle_connection(registry, stream, peer).await;
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// One connection: upgrade, register, then route frames until it drops.
async fn handle_connection(
    registry: Arc<ConnectionRegistry>,
    stream: TcpStream,
    peer: SocketAddr,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!(peer = %peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (mut sink, mut inbound) = ws.split();
    let (id, mut outbound) = registry.register();
    info!(peer = %peer, id, viewers = registry.viewer_count(), "Peer connected");

    // Writer task: drains this connection's queue. A slow peer backs up
    // only its own queue, never the broadcast path.
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = inbound.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if text.starts_with(IMAGE_FRAME_PREFIX) {
                    let reached = registry.broadcast_from(id, &Message::text(text.as_str()));
                    debug!(id, reached, "Snapshot broadcast");
                } else {
                    // Liveness/testing path: echoed to the sender only.
                    registry.send_to(id, Message::text(format!("{}{}", ECHO_REPLY_PREFIX, text)));
                }
            }
            Ok(Message::Ping(payload)) => {
                registry.send_to(id, Message::Pong(payload));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Binary and pong frames are not part of the protocol.
            }
            Err(e) => {
                debug!(peer = %peer, id, error = %e, "Connection error");
                break;
            }
        }
    }

    registry.remove(id);
    writer.abort();
    info!(peer = %peer, id, viewers = registry.viewer_count(), "Peer disconnected");
}
