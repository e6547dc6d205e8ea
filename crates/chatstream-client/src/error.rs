use thiserror::Error;

/// Errors raised while building or configuring clients
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {detail}")]
    InvalidBaseUrl { url: String, detail: String },

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures reported by a [`Transport`](crate::Transport)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established
    #[error("Connection failed to {url}: {detail}")]
    Connect { url: String, detail: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The byte stream broke after it was opened
    #[error("Stream error: {0}")]
    Stream(String),

    /// One line of the stream was not valid UTF-8; the line is dropped
    #[error("Invalid UTF-8 in stream line: {0}")]
    InvalidUtf8(String),
}

impl TransportError {
    /// Whether the connection is gone for good and needs to be re-opened
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransportError::InvalidUtf8(_))
    }
}

/// Failure delivered to [`StreamHandler::on_error`](crate::StreamHandler::on_error)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamFailure {
    /// `error` event sent by the server inside the stream
    #[error("Server error: {}", .message.as_deref().unwrap_or("unknown error"))]
    Server { message: Option<String> },

    /// Reconnect attempts ran out; only a new `connect()` recovers
    #[error("Unable to reconnect to the server after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

impl StreamFailure {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFailure::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_utf8_errors_are_recoverable() {
        assert!(!TransportError::InvalidUtf8("bad byte".into()).is_terminal());
        assert!(TransportError::Stream("reset".into()).is_terminal());
        assert!(TransportError::Status {
            status: 403,
            url: "http://localhost/chat/api/stream/1".into()
        }
        .is_terminal());
    }

    #[test]
    fn test_failure_messages() {
        let server = StreamFailure::Server {
            message: Some("db gone".into()),
        };
        assert_eq!(server.to_string(), "Server error: db gone");
        assert!(!server.is_terminal());

        let bare = StreamFailure::Server { message: None };
        assert_eq!(bare.to_string(), "Server error: unknown error");

        let exhausted = StreamFailure::Exhausted { attempts: 10 };
        assert!(exhausted.to_string().contains("10 attempts"));
        assert!(exhausted.is_terminal());
    }
}
