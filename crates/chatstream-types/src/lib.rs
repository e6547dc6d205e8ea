//! Wire types shared by the chat stream client and its consumers.
//!
//! Every event pushed by the chat server is a JSON object with a mandatory
//! `type` tag. [`InboundEvent`] models the known tags plus a catch-all, and
//! [`decode_event`] turns one SSE `data` payload into it.

pub mod events;
pub mod message;
pub mod read_status;
pub mod time;

pub use events::{decode_event, DecodeError, DomainEvent, InboundEvent};
pub use message::{Attachment, ChatMessage, LastMessage, ReplyPreview, RoomUpdate};
pub use read_status::{ReadMark, ReadStatus, ReadStatusRequest, ReadStatusResponse};
pub use time::parse_timestamp;
