use chatstream_types::ChatMessage;

/// Maximum preview length, in characters
pub const PREVIEW_MAX_CHARS: usize = 50;

const FALLBACK_TEXT: &str = "New message";

/// Desktop/UI notification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
}

impl Notification {
    /// Notification for a message written by someone else
    pub fn for_message(message: &ChatMessage) -> Self {
        let title = message
            .sender_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_TEXT.to_string());

        let body = match message.content.as_deref() {
            Some(content) if !content.is_empty() => truncate_preview(content, PREVIEW_MAX_CHARS),
            _ => FALLBACK_TEXT.to_string(),
        };

        Self {
            title,
            body,
            icon: None,
        }
    }
}

/// Cut `text` to `max_chars` characters, appending `...` when anything was cut
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Consumer of notifications; rendering them is up to the host
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            "Chat notification"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(truncate_preview("hello", 50), "hello");
        assert_eq!(truncate_preview(&"a".repeat(50), 50), "a".repeat(50));
    }

    #[test]
    fn test_long_text_is_cut_with_ellipsis() {
        let text = "x".repeat(60);
        assert_eq!(truncate_preview(&text, 50), format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn test_cut_counts_characters_not_bytes() {
        let text = "é".repeat(51);
        assert_eq!(truncate_preview(&text, 50), format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_message_notification_fallbacks() {
        let message = ChatMessage::default();
        let notification = Notification::for_message(&message);

        assert_eq!(notification.title, "New message");
        assert_eq!(notification.body, "New message");
        assert_eq!(notification.icon, None);
    }

    #[test]
    fn test_message_notification_uses_sender_and_content() {
        let message = ChatMessage {
            sender_name: Some("amina".to_string()),
            content: Some("hello".to_string()),
            ..Default::default()
        };
        let notification = Notification::for_message(&message);

        assert_eq!(notification.title, "amina");
        assert_eq!(notification.body, "hello");
    }
}
