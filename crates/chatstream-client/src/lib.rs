//! Reconnecting Server-Sent-Events client for the chat streams.
//!
//! Two subscriptions share one design:
//!
//! - a per-room message stream (`/chat/api/stream/{room_id}`), which also
//!   raises a notification for messages written by someone else;
//! - the room-list stream (`/chat/api/stream/rooms`).
//!
//! [`EventStreamClient`] owns the live connection and re-opens it after a
//! terminal close with a linear backoff, giving up after a fixed number of
//! attempts. The decision logic lives in [`Session`], which performs no I/O.
//!
//! ```rust,no_run
//! use chatstream_client::prelude::*;
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl StreamHandler for Printer {
//!     fn on_message(&self, event: DomainEvent) {
//!         println!("{event:?}");
//!     }
//!
//!     fn on_error(&self, failure: StreamFailure) {
//!         eprintln!("{failure}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("http://localhost:5000");
//!     let transport = Arc::new(HttpTransport::new(&config)?);
//!
//!     let mut client = EventStreamClient::builder(StreamKind::Messages { room_id: 4 })
//!         .transport(transport)
//!         .handler(Arc::new(Printer))
//!         .context(ClientContext::new().with_current_user(7))
//!         .build()?;
//!
//!     client.connect();
//!     tokio::signal::ctrl_c().await?;
//!     client.disconnect();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod policy;
pub mod read_status;
pub mod session;
pub mod sse;
pub mod transport;

pub use client::{EventStreamClient, EventStreamClientBuilder, SessionStatus, StreamHandler};
pub use config::{ClientConfig, ReconnectSettings};
pub use context::ClientContext;
pub use error::{ClientError, Result, StreamFailure, TransportError};
pub use notify::{LogNotifier, Notification, Notifier, NoopNotifier};
pub use policy::ReconnectPolicy;
pub use read_status::{OwnMessageSource, ReadMarkSink, ReadStatusFetcher, ReadStatusPoller};
pub use session::{CloseOutcome, ConnectionState, Dispatch, Session, StreamKind};
pub use sse::{parse_sse_stream, CircularLineBuffer, FrameDecoder, SseFrame};
pub use transport::{FrameStream, HttpTransport, Transport};

pub use chatstream_types::{ChatMessage, DomainEvent, InboundEvent, ReadMark, RoomUpdate};

pub mod prelude {
    pub use crate::{
        ClientConfig, ClientContext, DomainEvent, EventStreamClient, HttpTransport, Notifier,
        ReconnectPolicy, StreamFailure, StreamHandler, StreamKind, Transport,
    };
}
