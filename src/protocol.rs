// MIT License - Copyright (c) 2026 The lora-sentinel authors

//! Wire contract with the peer transmitter.
//!
//! Both directions carry a single JSON object per radio frame, identified
//! by a `"type"` tag.
//!
//! # Inbound
//!
//! The only frame the receiver acts on is the motion announcement:
//!
//! ```text
//! {"type":"MOTION", ...sensor fields ignored...}
//! ```
//!
//! Decoding is strict and fails closed: a frame whose tag is unknown (or
//! that is not JSON at all) is dropped silently, with no error surfaced.
//!
//! # Outbound
//!
//! ```text
//! {"type":"STATUS","id":"<receiverID>","busy":<bool>,"alarm":<bool>,"ready":<bool>,"time":<uptime-ms>}
//! ```
//!
//! Field order is normative: the peer parses this exact layout. It is
//! guaranteed by the declaration order of [`StatusMessage`], which is why
//! the struct must not be reordered.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::NodeState;

/// Kinds of inbound events the receiver understands.
///
/// The wire decode is an internally tagged enum so that an unrecognized
/// tag fails the whole decode rather than producing a half-valid event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundKind {
    #[serde(rename = "MOTION")]
    Motion {},
}

/// A decoded inbound event. Transient: produced by packet ingest and
/// consumed within the same loop iteration.
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    pub kind: InboundKind,
    /// The raw frame text, kept for logging and alert payloads.
    pub payload: String,
    /// Signal strength reported by the radio for this frame (dBm).
    pub rssi: i16,
    /// Uptime timestamp at which the frame was drained.
    pub received_at: u64,
}

/// Decode an inbound frame, failing closed.
///
/// Returns `None` for anything that is not a well-formed frame with a
/// known tag; unknown input is dropped, never an error.
pub fn decode_inbound(payload: &str) -> Option<InboundKind> {
    serde_json::from_str::<InboundKind>(payload).ok()
}

/// Outbound status message. Field order is the wire contract — do not
/// reorder the fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub busy: bool,
    pub alarm: bool,
    pub ready: bool,
    /// Node uptime in milliseconds.
    pub time: u64,
}

impl StatusMessage {
    /// Snapshot the current node state at uptime `now`.
    pub fn from_state(state: &NodeState, now: u64) -> Self {
        Self {
            kind: crate::constants::MSG_TYPE_STATUS.to_string(),
            id: state.receiver_id.clone(),
            busy: state.is_busy,
            alarm: state.alarm_active,
            ready: state.is_ready,
            time: now,
        }
    }

    /// Serialize to the wire representation.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_motion() {
        assert_eq!(
            decode_inbound(r#"{"type":"MOTION","rssi":-42}"#),
            Some(InboundKind::Motion {})
        );
        // The serde rename and the wire-tag constant must agree.
        assert_eq!(
            decode_inbound(&format!(
                r#"{{"type":"{}"}}"#,
                crate::constants::MSG_TYPE_MOTION
            )),
            Some(InboundKind::Motion {})
        );
    }

    #[test]
    fn test_decode_unknown_tag_dropped() {
        assert_eq!(decode_inbound(r#"{"type":"PING"}"#), None);
        assert_eq!(decode_inbound(r#"{"type":"STATUS","id":"RX-0"}"#), None);
    }

    #[test]
    fn test_decode_malformed_dropped() {
        assert_eq!(decode_inbound(""), None);
        assert_eq!(decode_inbound("not json"), None);
        assert_eq!(decode_inbound(r#"{"rssi":-42}"#), None);
        assert_eq!(decode_inbound(r#"["type","MOTION"]"#), None);
    }

    #[test]
    fn test_status_wire_layout() {
        let mut state = NodeState::new("RX-1A2B3C".to_string());
        state.alarm_active = true;
        state.is_ready = false;

        let msg = StatusMessage::from_state(&state, 123456);
        let json = msg.encode().unwrap();
        // Field order is normative for the peer.
        assert_eq!(
            json,
            r#"{"type":"STATUS","id":"RX-1A2B3C","busy":false,"alarm":true,"ready":false,"time":123456}"#
        );
    }

    #[test]
    fn test_status_roundtrip() {
        let state = NodeState::new("RX-1A2B3C".to_string());
        let msg = StatusMessage::from_state(&state, 99);
        let decoded: StatusMessage = serde_json::from_str(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded, msg);
        assert!(decoded.ready);
        assert_eq!(decoded.time, 99);
    }
}
