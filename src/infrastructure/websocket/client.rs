use crate::domain::error::{ProbeError, ProbeResult};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Single websocket connection to the daemon.
pub struct WsClient {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Open a connection. No connect timeout is applied.
    pub async fn connect(url: &str) -> ProbeResult<Self> {
        let (stream, _) = connect_async(url).await?;
        info!("WebSocket connection established to {}", url);

        Ok(Self {
            url: url.to_string(),
            stream,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one text frame without waiting for any acknowledgement.
    pub async fn send_text(&mut self, frame: &str) -> ProbeResult<()> {
        self.stream.send(Message::Text(frame.to_string())).await?;
        debug!("Sent frame to {}: {}", self.url, frame);
        Ok(())
    }

    /// Wait for the next data frame. There is no timeout: a silent peer
    /// keeps this pending until the caller gives up.
    pub async fn recv_text(&mut self) -> ProbeResult<String> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                Message::Text(text) => {
                    debug!("Received text frame from {} ({} bytes)", self.url, text.len());
                    return Ok(text);
                }
                Message::Binary(data) => {
                    return String::from_utf8(data).map_err(|e| {
                        ProbeError::InvalidData(format!("binary frame is not UTF-8: {}", e))
                    });
                }
                Message::Close(frame) => {
                    debug!("Peer {} sent close: {:?}", self.url, frame);
                    break;
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }

        Err(ProbeError::Protocol(format!(
            "{} closed the connection before replying",
            self.url
        )))
    }

    /// Close the connection. Failures are logged, not returned.
    pub async fn close(mut self) {
        match self.stream.close(None).await {
            Ok(()) => info!("WebSocket connection to {} closed", self.url),
            Err(e) => warn!("Closing websocket to {} failed: {}", self.url, e),
        }
    }
}
