//! Dispatch client for the WhatsApp bridge.
//!
//! One call to [`DispatchClient::send`] is one dispatch attempt: validate,
//! connect, send a single `send` frame, wait for a single reply, close. There
//! are no internal retries; retry policy belongs to the caller.
//!
//! The bridge is reached through the [`BridgeTransport`] trait. Production
//! code uses [`WebSocketTransport`]; tests plug in scripted transports.

pub mod client;
pub mod protocol;
pub mod transport;
pub mod websocket;

use std::fmt;

pub use client::{validate_request, DispatchClient, MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};
pub use protocol::{classify_reply, BridgeRequest, MalformedReply, ReplyClass};
pub use transport::{BridgeConnection, BridgeTransport};
pub use websocket::WebSocketTransport;

/// Errors raised before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Phone or message failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The client was built without a transport.
    #[error("bridge transport unavailable: no transport configured")]
    TransportUnavailable,
}

/// Errors from a [`BridgeTransport`] or [`BridgeConnection`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint actively refused the connection.
    #[error("connection refused: {0}")]
    Refused(String),

    /// Connecting failed for another reason (DNS, handshake, TLS, ...).
    #[error("connection failed: {0}")]
    Connect(String),

    /// Writing the request frame failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Reading the reply frame failed.
    #[error("receive failed: {0}")]
    Receive(String),
}

/// How a delivery was confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmedBy {
    /// The bridge replied with `type: "sent"`.
    Sent,
    /// The bridge replied with some other, non-error frame type. Accepted
    /// under the optimistic status-frame policy; see [`ReplyClass::Status`].
    StatusFrame(String),
}

/// Terminal state of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The bridge acknowledged the send.
    Confirmed {
        /// Phone as given by the caller.
        phone: String,
        /// Bridge address the message was sent to.
        address: String,
        /// Which reply confirmed it.
        by: ConfirmedBy,
    },
    /// The request was written but no reply arrived in time. The message may
    /// or may not have been delivered.
    Unconfirmed {
        /// Phone as given by the caller.
        phone: String,
        /// Bridge address the message was sent to.
        address: String,
    },
    /// The bridge replied with an error frame.
    Rejected {
        /// Bridge-supplied reason, or `"unknown"`.
        reason: String,
    },
    /// The bridge could not be reached, or the connection failed mid-attempt.
    ConnectFailed {
        /// Endpoint that was attempted.
        endpoint: String,
        /// Underlying diagnostic.
        reason: String,
    },
}

impl DispatchOutcome {
    /// Whether the message may have reached the bridge (confirmed or timed out).
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Unconfirmed { .. })
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed {
                phone,
                address,
                by: ConfirmedBy::Sent,
            } => write!(f, "OK: Message sent to {phone} ({address})"),
            Self::Confirmed {
                phone,
                address,
                by: ConfirmedBy::StatusFrame(_),
            } => write!(f, "OK: Message dispatched to {phone} ({address})"),
            Self::Unconfirmed { phone, address } => write!(
                f,
                "WARNING: Message sent to {phone} ({address}) but no confirmation received (timeout). Check bridge logs."
            ),
            Self::Rejected { reason } => write!(f, "ERROR: bridge rejected message: {reason}"),
            Self::ConnectFailed { endpoint, reason } => write!(
                f,
                "ERROR: cannot reach WhatsApp bridge at {endpoint}: {reason}. Make sure the bridge is running."
            ),
        }
    }
}
