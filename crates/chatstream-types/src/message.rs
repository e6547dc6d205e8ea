use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::time::parse_timestamp;

/// Payload of a `new_message` event
///
/// The server owns this shape, so every field is optional and anything not
/// listed here survives in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyPreview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn edited_at_utc(&self) -> Option<DateTime<Utc>> {
        self.edited_at.as_deref().and_then(parse_timestamp)
    }

    /// True when the message carries no text, e.g. attachment-only posts
    pub fn is_empty_text(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_empty)
    }
}

/// Quoted message a reply points at (content already cut to 100 chars server-side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyPreview {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
}

/// Payload of a `room_update` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub room_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<LastMessage>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMessage {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl LastMessage {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{decode_event, InboundEvent};

    #[test]
    fn test_decode_full_new_message() {
        let raw = r#"{
            "type": "new_message",
            "id": 981,
            "room_id": 4,
            "sender_id": 42,
            "sender_name": "amina",
            "content": "hello",
            "message_type": "text",
            "is_edited": false,
            "edited_at": null,
            "reply_to_id": 970,
            "reply_to": {"id": 970, "sender_name": "paul", "content": "ping"},
            "created_at": "2024-05-01T10:00:00",
            "attachments": [{
                "id": 3,
                "file_name": "plan.pdf",
                "file_path": "uploads/chat/plan.pdf",
                "file_size": 2048,
                "file_type": "application/pdf",
                "is_image": false,
                "thumbnail_path": null
            }]
        }"#;

        let InboundEvent::NewMessage(message) = decode_event(raw).unwrap() else {
            panic!("Expected NewMessage variant");
        };

        assert_eq!(message.id, Some(981));
        assert_eq!(message.sender_id, Some(42));
        assert_eq!(message.content.as_deref(), Some("hello"));
        assert_eq!(message.reply_to.as_ref().map(|r| r.id), Some(970));
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].file_size, Some(2048));
        assert!(message.created_at_utc().is_some());
        assert!(message.edited_at_utc().is_none());
        assert!(message.extra.is_empty());
    }

    #[test]
    fn test_minimal_new_message_keeps_unknown_fields() {
        let raw = r#"{"type":"new_message","sender_id":42,"content":"hello","pinned":true}"#;
        let InboundEvent::NewMessage(message) = decode_event(raw).unwrap() else {
            panic!("Expected NewMessage variant");
        };

        assert_eq!(message.sender_id, Some(42));
        assert_eq!(message.extra.get("pinned"), Some(&Value::Bool(true)));
        assert!(!message.extra.contains_key("type"));
    }

    #[test]
    fn test_empty_text_detection() {
        let mut message = ChatMessage::default();
        assert!(message.is_empty_text());

        message.content = Some(String::new());
        assert!(message.is_empty_text());

        message.content = Some("hi".to_string());
        assert!(!message.is_empty_text());
    }

    #[test]
    fn test_decode_room_update() {
        let raw = r#"{
            "type": "room_update",
            "room_id": 4,
            "last_message": {
                "id": 981,
                "content": "see you tomorrow",
                "sender_name": "amina",
                "created_at": "2024-05-01T10:00:00+00:00"
            },
            "unread_count": 3
        }"#;

        let InboundEvent::RoomUpdate(update) = decode_event(raw).unwrap() else {
            panic!("Expected RoomUpdate variant");
        };

        assert_eq!(update.room_id, 4);
        assert_eq!(update.unread_count, 3);
        let last = update.last_message.unwrap();
        assert_eq!(last.content, "see you tomorrow");
        assert!(last.created_at_utc().is_some());
    }

    #[test]
    fn test_room_update_requires_room_id() {
        assert!(decode_event(r#"{"type":"room_update","unread_count":1}"#).is_err());
    }
}
