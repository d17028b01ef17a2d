//! WebSocket client for streaming snapshots to the relay.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use plantsight_common::IMAGE_FRAME_PREFIX;

use crate::error::Result;
use crate::snapshot::Snapshot;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lazily connecting relay client.
///
/// Connects on first use and reconnects on the next send after a
/// failure. The publisher treats every error here as best-effort: log,
/// drop the snapshot, move on.
pub struct RelayClient {
    url: String,
    stream: Option<WsStream>,
}

impl RelayClient {
    /// Create a client for the given `ws://` URL. Does not connect yet.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
        }
    }

    /// The relay URL this client targets.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Encode a snapshot as a relay frame: `"image:" + base64(bytes)`.
    pub fn encode_frame(snapshot: &Snapshot) -> String {
        format!("{}{}", IMAGE_FRAME_PREFIX, BASE64.encode(snapshot.as_bytes()))
    }

    /// Stream one snapshot to the relay.
    ///
    /// On any error the cached connection is dropped so the next call
    /// reconnects from scratch.
    pub async fn send_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let frame = Self::encode_frame(snapshot);

        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => {
                let (stream, _response) = connect_async(self.url.as_str()).await?;
                tracing::info!(url = %self.url, "Connected to snapshot relay");
                self.stream.insert(stream)
            }
        };

        if let Err(e) = stream.send(Message::text(frame)).await {
            self.stream = None;
            return Err(e.into());
        }

        Ok(())
    }

    /// Close the relay connection, if open.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                tracing::debug!(error = %e, "Error closing relay connection");
            }
        }
    }
}
