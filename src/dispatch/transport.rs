//! Transport abstraction between the dispatch client and the bridge.

use async_trait::async_trait;

use super::TransportError;

/// Opens connections to a bridge endpoint.
///
/// Implementations must be `Send + Sync` so one transport can serve many
/// concurrent dispatch attempts.
#[async_trait]
pub trait BridgeTransport: Send + Sync {
    /// Open a fresh connection to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Refused`] when the endpoint refuses the
    /// connection, [`TransportError::Connect`] for any other failure.
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn BridgeConnection>, TransportError>;
}

/// One open, message-based connection. Carries at most one request in flight.
#[async_trait]
pub trait BridgeConnection: Send {
    /// Write one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] on write failure.
    async fn send_text(&mut self, frame: String) -> Result<(), TransportError>;

    /// Read the next text frame, or `None` if the peer closed the connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Receive`] on read failure.
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError>;

    /// Close the connection. Best effort; never fails.
    async fn close(&mut self);
}
