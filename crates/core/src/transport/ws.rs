//! WebSocket dialing and text frame pumps

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::{CoreError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Open a WebSocket to `url` and split it into its two halves
///
/// A peer that accepts TCP but never completes the upgrade fails with a
/// transport error once `timeout` elapses.
pub async fn dial(url: &str, timeout: Duration) -> Result<(FrameSender, FrameReceiver)> {
    let (ws, response) = tokio::time::timeout(timeout, connect_async(url))
        .await
        .map_err(|_| CoreError::Transport(format!("handshake timed out after {:?}", timeout)))??;
    tracing::debug!("WebSocket handshake complete: {}", response.status());

    let (sink, stream) = ws.split();
    Ok((FrameSender { sink }, FrameReceiver { stream }))
}

/// Outbound half of a connection
pub struct FrameSender {
    sink: SplitSink<WsStream, Message>,
}

impl FrameSender {
    pub async fn send_text(&mut self, frame: String) -> Result<()> {
        self.sink.send(Message::Text(frame)).await?;
        Ok(())
    }

    /// Send a close frame; errors are only logged
    pub async fn close(&mut self) {
        if let Err(e) = self.sink.close().await {
            tracing::debug!("Error while closing WebSocket: {}", e);
        }
    }
}

/// Inbound half of a connection
pub struct FrameReceiver {
    stream: SplitStream<WsStream>,
}

impl FrameReceiver {
    /// Next text frame
    ///
    /// `None` once the peer closed the socket. Binary and control frames are
    /// skipped.
    pub async fn next_frame(&mut self) -> Option<Result<String>> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(msg) => msg,
                Err(e) => return Some(Err(e.into())),
            };

            match msg {
                Message::Text(text) => return Some(Ok(text)),
                Message::Close(frame) => {
                    tracing::debug!("Peer closed WebSocket: {:?}", frame);
                    return None;
                }
                other => {
                    tracing::trace!("Skipping non-text frame ({} bytes)", other.len());
                }
            }
        }
    }
}
