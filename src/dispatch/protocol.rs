//! Bridge wire protocol: JSON text frames.
//!
//! Outbound: `{"type": "send", "to": "<digits>@s.whatsapp.net", "text": "..."}`.
//! Inbound: `{"type": "sent", ...}` on success, `{"type": "error", "error": "..."}`
//! on failure, anything else is a status notification.

use serde::{Deserialize, Serialize};

/// Placeholder reason when an error frame carries none.
pub const UNKNOWN_REASON: &str = "unknown";

/// A request frame sent to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeRequest {
    /// Send a text message.
    Send {
        /// Destination JID.
        to: String,
        /// Message body.
        text: String,
    },
}

impl BridgeRequest {
    /// Encode as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the serializer error.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Classification of a single reply frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyClass {
    /// `type: "sent"`.
    Sent,
    /// `type: "error"`, with the bridge's reason or [`UNKNOWN_REASON`].
    Error(String),
    /// Any other `type` (including a missing one).
    ///
    /// Optimistic status-frame policy: bridges may emit intermediate status
    /// notifications before the real confirmation, and only one frame is read
    /// per attempt, so a non-error frame is taken as confirmation. This is a
    /// heuristic, not a protocol guarantee.
    Status(String),
}

/// A reply that is not a JSON object.
#[derive(Debug, thiserror::Error)]
#[error("malformed bridge reply: {0}")]
pub struct MalformedReply(String);

/// Classify a raw reply frame.
///
/// # Errors
///
/// Returns [`MalformedReply`] if the frame is not a JSON object.
pub fn classify_reply(raw: &str) -> Result<ReplyClass, MalformedReply> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| MalformedReply(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| MalformedReply(format!("expected a JSON object, got {value}")))?;

    let kind = object
        .get("type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    Ok(match kind {
        "sent" => ReplyClass::Sent,
        "error" => ReplyClass::Error(match object.get("error") {
            None | Some(serde_json::Value::Null) => UNKNOWN_REASON.to_owned(),
            Some(serde_json::Value::String(reason)) => reason.clone(),
            Some(other) => other.to_string(),
        }),
        other => ReplyClass::Status(other.to_owned()),
    })
}
