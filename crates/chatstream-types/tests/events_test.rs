use chatstream_types::{decode_event, DomainEvent, InboundEvent, ReadMark, ReadStatusResponse};

#[test]
fn test_decode_new_message_from_server() {
    let raw = r#"{
        "type": "new_message",
        "id": 101,
        "room_id": 4,
        "sender_id": 42,
        "sender_name": "amina",
        "content": "Bonjour",
        "message_type": "text",
        "created_at": "2024-05-01T10:15:00.123456",
        "is_edited": false,
        "attachments": [],
        "reply_to": null
    }"#;

    match decode_event(raw).unwrap() {
        InboundEvent::NewMessage(message) => {
            assert_eq!(message.id, Some(101));
            assert_eq!(message.sender_name.as_deref(), Some("amina"));
            assert!(message.created_at_utc().is_some());
            assert!(!message.is_edited);
        }
        other => panic!("Expected NewMessage, got {other:?}"),
    }
}

#[test]
fn test_decode_room_update_from_server() {
    let raw = r#"{
        "type": "room_update",
        "room_id": 9,
        "last_message": {
            "id": 300,
            "content": "see you",
            "sender_name": "yan",
            "created_at": "2024-05-01T11:00:00"
        },
        "unread_count": 3
    }"#;

    match decode_event(raw).unwrap() {
        InboundEvent::RoomUpdate(update) => {
            assert_eq!(update.room_id, 9);
            assert_eq!(update.unread_count, 3);
            assert_eq!(update.last_message.map(|m| m.id), Some(300));
        }
        other => panic!("Expected RoomUpdate, got {other:?}"),
    }
}

#[test]
fn test_decode_control_events() {
    assert!(matches!(
        decode_event(r#"{"type":"connected","timestamp":"2024-05-01T10:00:00"}"#).unwrap(),
        InboundEvent::Connected { .. }
    ));
    assert!(matches!(
        decode_event(r#"{"type":"heartbeat"}"#).unwrap(),
        InboundEvent::Heartbeat { .. }
    ));
    assert_eq!(
        decode_event(r#"{"type":"error","message":"boom"}"#).unwrap(),
        InboundEvent::Error {
            message: Some("boom".to_string())
        }
    );
}

#[test]
fn test_unknown_type_is_not_an_error() {
    assert_eq!(
        decode_event(r#"{"type":"typing","user":3}"#).unwrap(),
        InboundEvent::Unknown
    );
}

#[test]
fn test_missing_type_is_an_error() {
    assert!(decode_event(r#"{"content":"hi"}"#).is_err());
    assert!(decode_event("not json").is_err());
}

#[test]
fn test_domain_event_keeps_type_tag() {
    let event = DomainEvent::RoomUpdate(
        serde_json::from_str(r#"{"room_id":1,"unread_count":0}"#).unwrap(),
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"room_update\""));
}

#[test]
fn test_read_status_marks_from_server_response() {
    let raw = r#"{"read_statuses":{
        "1":{"read_count":2,"total_members":3},
        "2":{"read_count":1,"total_members":4},
        "3":{"read_count":0,"total_members":4}
    }}"#;
    let marks = serde_json::from_str::<ReadStatusResponse>(raw).unwrap().marks();

    assert_eq!(marks[&1], ReadMark::AllRead);
    assert_eq!(marks[&2], ReadMark::PartiallyRead { readers: 1 });
    assert_eq!(marks[&3], ReadMark::Unread);
}
