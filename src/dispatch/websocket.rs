//! WebSocket transport to the baileys bridge.

use std::io::ErrorKind;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use super::transport::{BridgeConnection, BridgeTransport};
use super::TransportError;

/// Transport that opens one WebSocket per dispatch attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl BridgeTransport for WebSocketTransport {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn BridgeConnection>, TransportError> {
        let (stream, response) = connect_async(endpoint).await.map_err(connect_error)?;
        debug!(endpoint, status = %response.status(), "bridge websocket connected");
        Ok(Box::new(WebSocketConnection { stream }))
    }
}

fn connect_error(err: WsError) -> TransportError {
    match err {
        WsError::Io(io) if io.kind() == ErrorKind::ConnectionRefused => {
            TransportError::Refused(io.to_string())
        }
        other => TransportError::Connect(other.to_string()),
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl BridgeConnection for WebSocketConnection {
    async fn send_text(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Binary(bytes)) => {
                    return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Ok(Message::Close(frame)) => {
                    trace!(?frame, "bridge sent close frame");
                    return Ok(None);
                }
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => continue,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return Ok(None),
                Err(e) => return Err(TransportError::Receive(e.to_string())),
            }
        }
        Ok(None)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            trace!(error = %e, "bridge websocket close failed");
        }
    }
}
