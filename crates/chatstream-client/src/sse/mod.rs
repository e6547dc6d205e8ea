mod buffering;
mod decoder;
mod parser;

pub use buffering::CircularLineBuffer;
pub use decoder::{FrameDecoder, SseFrame};
pub use parser::parse_sse_stream;
