/// One dispatched Server-Sent Event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// `event:` field; `None` means the default `message` type
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`
    pub data: String,
    /// `id:` field if this frame carried one (empty string resets the id)
    pub id: Option<String>,
}

impl SseFrame {
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
            id: None,
        }
    }

    /// Unnamed frames and frames explicitly named `message`
    pub fn is_message(&self) -> bool {
        self.event.as_deref().map_or(true, |name| name == "message")
    }
}

/// Assembles SSE frames from decoded lines
#[derive(Debug, Default)]
pub struct FrameDecoder {
    event: Option<String>,
    data: Option<String>,
    id: Option<String>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without terminator). Returns a frame on a blank line
    /// that closes a frame with at least one `data` field.
    pub fn push_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => match self.data.as_mut() {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            "event" => self.event = Some(value.to_string()),
            "id" if !value.contains('\0') => self.id = Some(value.to_string()),
            // retry hints are ignored, ReconnectPolicy owns reconnect timing
            _ => {}
        }

        None
    }

    /// Drop any partially assembled frame
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let id = self.id.take();
        let data = self.data.take()?;

        Some(SseFrame { event, data, id })
    }
}
