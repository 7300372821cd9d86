//! Single-attempt dispatch to the bridge.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::protocol::{classify_reply, BridgeRequest, ReplyClass};
use super::transport::{BridgeConnection, BridgeTransport};
use super::websocket::WebSocketTransport;
use super::{ConfirmedBy, DispatchError, DispatchOutcome};
use crate::config::BridgeConfig;
use crate::phone::{bridge_address, digit_count};

/// Fewest digits accepted in a destination phone number.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Most digits accepted in a destination phone number (E.164 maximum).
pub const MAX_PHONE_DIGITS: usize = 15;

/// Sends one message per call through a [`BridgeTransport`].
///
/// Holds no mutable state; concurrent calls each open their own connection.
pub struct DispatchClient {
    endpoint: String,
    confirm_timeout: Duration,
    transport: Option<Arc<dyn BridgeTransport>>,
}

impl DispatchClient {
    /// Client for the configured endpoint using the given transport.
    pub fn new(config: &BridgeConfig, transport: Arc<dyn BridgeTransport>) -> Self {
        Self {
            endpoint: config.url.clone(),
            confirm_timeout: config.confirm_timeout(),
            transport: Some(transport),
        }
    }

    /// Client for the configured endpoint over WebSocket.
    pub fn websocket(config: &BridgeConfig) -> Self {
        Self::new(config, Arc::new(WebSocketTransport))
    }

    /// Client with no transport. Every valid `send` fails with
    /// [`DispatchError::TransportUnavailable`].
    pub fn unavailable(config: &BridgeConfig) -> Self {
        Self {
            endpoint: config.url.clone(),
            confirm_timeout: config.confirm_timeout(),
            transport: None,
        }
    }

    /// Bridge endpoint this client connects to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `message` to `phone` and classify the bridge's answer.
    ///
    /// Validation and a missing transport are reported as errors before any
    /// I/O. Everything after that is a [`DispatchOutcome`], including transport
    /// failures. The connection is closed before returning on every path.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidInput`] for an empty phone or message or
    /// a phone with a digit count outside
    /// [`MIN_PHONE_DIGITS`]..=[`MAX_PHONE_DIGITS`], and
    /// [`DispatchError::TransportUnavailable`] if no transport is configured.
    pub async fn send(&self, phone: &str, message: &str) -> Result<DispatchOutcome, DispatchError> {
        validate_request(phone, message)?;
        let transport = self
            .transport
            .as_ref()
            .ok_or(DispatchError::TransportUnavailable)?;

        let address = bridge_address(phone);
        debug!(endpoint = %self.endpoint, %address, "connecting to bridge");

        let mut conn = match transport.connect(&self.endpoint).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "bridge connection failed");
                return Ok(self.failed(e.to_string()));
            }
        };

        let outcome = self.exchange(conn.as_mut(), phone, address, message).await;
        conn.close().await;
        Ok(outcome)
    }

    /// Send the request frame and wait for exactly one reply.
    async fn exchange(
        &self,
        conn: &mut dyn BridgeConnection,
        phone: &str,
        address: String,
        message: &str,
    ) -> DispatchOutcome {
        let request = BridgeRequest::Send {
            to: address.clone(),
            text: message.to_owned(),
        };
        let frame = match request.to_frame() {
            Ok(frame) => frame,
            Err(e) => return self.failed(format!("failed to encode request: {e}")),
        };

        if let Err(e) = conn.send_text(frame).await {
            warn!(endpoint = %self.endpoint, error = %e, "bridge send failed");
            return self.failed(e.to_string());
        }

        let reply = match tokio::time::timeout(self.confirm_timeout, conn.recv_text()).await {
            Ok(Ok(Some(reply))) => reply,
            Ok(Ok(None)) => {
                return self.failed("bridge closed the connection before confirming".to_owned())
            }
            Ok(Err(e)) => {
                warn!(endpoint = %self.endpoint, error = %e, "bridge receive failed");
                return self.failed(e.to_string());
            }
            Err(_) => {
                warn!(
                    %address,
                    timeout_secs = self.confirm_timeout.as_secs(),
                    "no confirmation from bridge"
                );
                return DispatchOutcome::Unconfirmed {
                    phone: phone.to_owned(),
                    address,
                };
            }
        };

        match classify_reply(&reply) {
            Ok(ReplyClass::Sent) => {
                info!(%address, "message confirmed by bridge");
                DispatchOutcome::Confirmed {
                    phone: phone.to_owned(),
                    address,
                    by: ConfirmedBy::Sent,
                }
            }
            Ok(ReplyClass::Status(kind)) => {
                info!(%address, frame_type = %kind, "status frame accepted as confirmation");
                DispatchOutcome::Confirmed {
                    phone: phone.to_owned(),
                    address,
                    by: ConfirmedBy::StatusFrame(kind),
                }
            }
            Ok(ReplyClass::Error(reason)) => {
                warn!(%address, %reason, "bridge rejected message");
                DispatchOutcome::Rejected { reason }
            }
            Err(e) => self.failed(e.to_string()),
        }
    }

    fn failed(&self, reason: String) -> DispatchOutcome {
        DispatchOutcome::ConnectFailed {
            endpoint: self.endpoint.clone(),
            reason,
        }
    }
}

/// Check a send request before any network activity.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidInput`] if either field is empty or the
/// phone's digit count is outside [`MIN_PHONE_DIGITS`]..=[`MAX_PHONE_DIGITS`].
pub fn validate_request(phone: &str, message: &str) -> Result<(), DispatchError> {
    if phone.is_empty() || message.is_empty() {
        return Err(DispatchError::InvalidInput(
            "both phone and message are required".to_owned(),
        ));
    }
    let digits = digit_count(phone);
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(DispatchError::InvalidInput(format!(
            "invalid phone number {phone:?}: must be {MIN_PHONE_DIGITS}-{MAX_PHONE_DIGITS} digits with country code, got {digits}"
        )));
    }
    Ok(())
}
