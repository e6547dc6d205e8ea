use futures::{Stream, StreamExt};
use std::fmt::Display;

use super::buffering::CircularLineBuffer;
use super::decoder::FrameDecoder;
use crate::error::TransportError;
use crate::transport::FrameStream;

/// Turn a chunked byte stream into SSE frames.
///
/// A byte-stream error is yielded once and ends the frame stream. A line that
/// is not valid UTF-8 yields a non-terminal error and decoding carries on.
/// A frame still being assembled when the bytes run out is discarded.
pub fn parse_sse_stream<S, B, E>(byte_stream: S, capacity: usize) -> FrameStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(byte_stream);
        let mut buffer = CircularLineBuffer::with_capacity(capacity);
        let mut decoder = FrameDecoder::new();

        while let Some(chunk_result) = byte_chunks.next().await {
            let bytes = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(TransportError::Stream(e.to_string()));
                    break;
                }
            };

            buffer.extend(bytes.as_ref());

            while let Some(line_result) = buffer.next_line() {
                match line_result {
                    Ok(line) => {
                        if let Some(frame) = decoder.push_line(&line) {
                            yield Ok(frame);
                        }
                    }
                    Err(e) => yield Err(e),
                }
            }
        }
    })
}
