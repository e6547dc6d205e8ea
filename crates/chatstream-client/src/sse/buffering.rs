use std::collections::VecDeque;

use crate::error::TransportError;

/// Circular buffer for line-based parsing of a chunked byte stream
///
/// Chunks can split lines (and UTF-8 sequences) anywhere; bytes stay
/// buffered until their terminating `\n` arrives.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next complete line without its `\n` / `\r\n` terminator.
    ///
    /// Blank lines come back as empty strings: they delimit SSE frames and
    /// must not be skipped.
    pub fn next_line(&mut self) -> Option<Result<String, TransportError>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let mut line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        line_bytes.pop();
        if line_bytes.last() == Some(&b'\r') {
            line_bytes.pop();
        }

        match String::from_utf8(line_bytes) {
            Ok(line) => Some(Ok(line)),
            Err(e) => Some(Err(TransportError::InvalidUtf8(e.to_string()))),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_buffer_basic() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"line1\nline2\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "line1");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "line2");
        assert!(buffer.next_line().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"partial");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.len(), 7);

        buffer.extend(b" line\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "partial line");
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"data: x\r\n\r\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: x");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "");
        assert!(buffer.next_line().is_none());
    }

    #[test]
    fn test_leading_whitespace_is_kept() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        buffer.extend(b"data:  two spaces\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "data:  two spaces");
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        let text = "café\n".as_bytes();

        buffer.extend(&text[..4]);
        assert!(buffer.next_line().is_none());
        buffer.extend(&text[4..]);

        assert_eq!(buffer.next_line().unwrap().unwrap(), "café");
    }

    #[test]
    fn test_invalid_utf8_line_is_reported_and_dropped() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        buffer.extend(&[0xff, 0xfe, b'\n']);
        buffer.extend(b"ok\n");

        assert!(matches!(
            buffer.next_line(),
            Some(Err(TransportError::InvalidUtf8(_)))
        ));
        assert_eq!(buffer.next_line().unwrap().unwrap(), "ok");
    }
}
