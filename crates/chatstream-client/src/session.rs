//! Connection state machine for one stream subscription.
//!
//! [`Session`] performs no I/O. The driver in [`crate::client`] feeds it
//! transport signals (open, frame, terminal close) and carries out what it
//! returns: deliver an event, report a failure, sleep before reconnecting.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use chatstream_types::{decode_event, DomainEvent, InboundEvent};

use crate::context::ClientContext;
use crate::error::StreamFailure;
use crate::notify::Notification;
use crate::policy::ReconnectPolicy;
use crate::sse::SseFrame;

/// Which server-push endpoint a session follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stream", rename_all = "snake_case")]
pub enum StreamKind {
    /// New messages of one room
    Messages { room_id: i64 },
    /// Summary updates for all of the user's rooms
    Rooms,
}

impl StreamKind {
    /// Endpoint path relative to the server root
    pub fn path(&self) -> String {
        match self {
            StreamKind::Messages { room_id } => format!("chat/api/stream/{room_id}"),
            StreamKind::Rooms => "chat/api/stream/rooms".to_string(),
        }
    }

    pub fn default_policy(&self) -> ReconnectPolicy {
        match self {
            StreamKind::Messages { .. } => ReconnectPolicy::messages(),
            StreamKind::Rooms => ReconnectPolicy::rooms(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StreamKind::Messages { .. } => "messages",
            StreamKind::Rooms => "rooms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No transport and no pending reconnect
    Idle,
    Connecting,
    Open,
    /// Waiting out the backoff delay
    ReconnectScheduled,
    /// Gave up; needs an explicit `connect()`
    Exhausted,
}

/// What the driver must do with one inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Deliver {
        event: DomainEvent,
        notification: Option<Notification>,
    },
    Fail(StreamFailure),
    /// Valid but not for the handler: acks, heartbeats, foreign or unknown tags
    Skip,
    /// Payload could not be decoded; logged and dropped
    Malformed,
}

/// What the driver must do after a terminal close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Reconnect { attempt: u32, delay: Duration },
    Exhausted { attempts: u32 },
}

/// Counters and state of one logical subscription
#[derive(Debug, Clone)]
pub struct Session {
    kind: StreamKind,
    endpoint: String,
    policy: ReconnectPolicy,
    context: ClientContext,
    state: ConnectionState,
    attempts: u32,
    last_event_id: Option<String>,
    generation: u64,
}

impl Session {
    pub fn new(kind: StreamKind, policy: ReconnectPolicy, context: ClientContext) -> Self {
        Self {
            endpoint: kind.path(),
            kind,
            policy,
            context,
            state: ConnectionState::Idle,
            attempts: 0,
            last_event_id: None,
            generation: 0,
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Token of the current connection run; bumps on every start and stop
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new connection run, invalidating any previous one
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        self.generation
    }

    /// Explicit disconnect. The attempt counter is kept; only an open resets it.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.state = ConnectionState::Idle;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// A reconnect timer fired
    pub fn on_reconnecting(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Transport-level open; the only place the attempt counter resets
    pub fn on_open(&mut self) {
        self.attempts = 0;
        self.state = ConnectionState::Open;
    }

    pub fn on_frame(&mut self, frame: &SseFrame) -> Dispatch {
        if let Some(id) = &frame.id {
            self.last_event_id = (!id.is_empty()).then(|| id.clone());
        }

        if !frame.is_message() {
            tracing::trace!(stream = self.kind.label(), event = ?frame.event, "Skipping named SSE event");
            return Dispatch::Skip;
        }

        let event = match decode_event(&frame.data) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(stream = self.kind.label(), error = %e, "Discarding malformed stream payload");
                return Dispatch::Malformed;
            }
        };

        self.dispatch(event)
    }

    fn dispatch(&self, event: InboundEvent) -> Dispatch {
        match (self.kind, event) {
            (_, InboundEvent::Connected { .. }) => {
                tracing::info!(stream = self.kind.label(), "Stream acknowledged by server");
                Dispatch::Skip
            }
            (_, InboundEvent::Heartbeat { .. }) => {
                tracing::trace!(stream = self.kind.label(), "Heartbeat");
                Dispatch::Skip
            }
            (StreamKind::Messages { .. }, InboundEvent::NewMessage(message)) => {
                let notification = (!self.context.is_own_message(message.sender_id))
                    .then(|| Notification::for_message(&message));
                Dispatch::Deliver {
                    event: DomainEvent::NewMessage(message),
                    notification,
                }
            }
            (StreamKind::Rooms, InboundEvent::RoomUpdate(update)) => Dispatch::Deliver {
                event: DomainEvent::RoomUpdate(update),
                notification: None,
            },
            (_, InboundEvent::Error { message }) => {
                tracing::error!(
                    stream = self.kind.label(),
                    server_message = message.as_deref().unwrap_or_default(),
                    "Server reported a stream error"
                );
                Dispatch::Fail(StreamFailure::Server { message })
            }
            (_, other) => {
                tracing::debug!(stream = self.kind.label(), kind = other.kind(), "Ignoring event");
                Dispatch::Skip
            }
        }
    }

    pub fn on_terminal_close(&mut self) -> CloseOutcome {
        if self.policy.is_exhausted(self.attempts) {
            self.state = ConnectionState::Exhausted;
            return CloseOutcome::Exhausted {
                attempts: self.attempts,
            };
        }

        self.attempts += 1;
        self.state = ConnectionState::ReconnectScheduled;
        CloseOutcome::Reconnect {
            attempt: self.attempts,
            delay: self.policy.delay_for_attempt(self.attempts),
        }
    }
}
