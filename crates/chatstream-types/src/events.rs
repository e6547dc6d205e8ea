use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{ChatMessage, RoomUpdate};

/// One event pushed by the chat server, discriminated by its `type` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Session acknowledgement sent right after the stream opens
    Connected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },

    /// Liveness signal, roughly every 10 seconds
    Heartbeat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },

    /// A message posted in the subscribed room
    NewMessage(ChatMessage),

    /// Summary change for one of the user's rooms
    RoomUpdate(RoomUpdate),

    /// Error reported by the server inside the stream
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Any tag this client does not know yet
    #[serde(other)]
    Unknown,
}

impl InboundEvent {
    /// Wire tag of the event, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Connected { .. } => "connected",
            InboundEvent::Heartbeat { .. } => "heartbeat",
            InboundEvent::NewMessage(_) => "new_message",
            InboundEvent::RoomUpdate(_) => "room_update",
            InboundEvent::Error { .. } => "error",
            InboundEvent::Unknown => "unknown",
        }
    }
}

/// The subset of inbound events that carry application data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    NewMessage(ChatMessage),
    RoomUpdate(RoomUpdate),
}

impl From<DomainEvent> for InboundEvent {
    fn from(event: DomainEvent) -> Self {
        match event {
            DomainEvent::NewMessage(message) => InboundEvent::NewMessage(message),
            DomainEvent::RoomUpdate(update) => InboundEvent::RoomUpdate(update),
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed event payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the `data` field of one SSE frame
pub fn decode_event(data: &str) -> Result<InboundEvent, DecodeError> {
    Ok(serde_json::from_str(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_connected() {
        let event =
            decode_event(r#"{"type":"connected","timestamp":"2024-05-01T10:00:00+00:00"}"#)
                .unwrap();
        assert_eq!(
            event,
            InboundEvent::Connected {
                timestamp: Some("2024-05-01T10:00:00+00:00".to_string())
            }
        );
    }

    #[test]
    fn test_decode_heartbeat_without_timestamp() {
        let event = decode_event(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(event, InboundEvent::Heartbeat { timestamp: None });
        assert_eq!(event.kind(), "heartbeat");
    }

    #[test]
    fn test_decode_error_event() {
        let event = decode_event(r#"{"type":"error","message":"db gone"}"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::Error {
                message: Some("db gone".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_tag_is_catch_all() {
        let event = decode_event(r#"{"type":"typing","user":3}"#).unwrap();
        assert_eq!(event, InboundEvent::Unknown);
    }

    #[test]
    fn test_malformed_payloads_fail() {
        assert!(decode_event("not json").is_err());
        assert!(decode_event(r#"{"content":"no tag"}"#).is_err());
        assert!(decode_event("").is_err());
    }

    #[test]
    fn test_domain_event_serializes_like_wire_event() {
        let update = RoomUpdate {
            room_id: 9,
            last_message: None,
            unread_count: 2,
            extra: Default::default(),
        };
        let json = serde_json::to_value(DomainEvent::RoomUpdate(update.clone())).unwrap();
        assert_eq!(json["type"], "room_update");
        assert_eq!(json["room_id"], 9);

        let back: InboundEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, InboundEvent::RoomUpdate(update));
    }

    #[test]
    fn test_serialization_keeps_tag() {
        let json = serde_json::to_string(&InboundEvent::Heartbeat { timestamp: None }).unwrap();
        assert_eq!(json, r#"{"type":"heartbeat"}"#);
    }
}
