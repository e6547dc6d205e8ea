use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use chatstream_types::DomainEvent;

use crate::context::ClientContext;
use crate::error::{ClientError, Result, StreamFailure};
use crate::notify::{LogNotifier, Notifier};
use crate::policy::ReconnectPolicy;
use crate::session::{CloseOutcome, ConnectionState, Dispatch, Session, StreamKind};
use crate::transport::Transport;

/// Receives the outcome of a stream subscription
///
/// Both methods are called from the session's driver task, one at a time
/// and in transport order, while the session is locked. They should return
/// quickly and must not call back into the [`EventStreamClient`].
pub trait StreamHandler: Send + Sync {
    /// A decoded domain event (`new_message` or `room_update`)
    fn on_message(&self, event: DomainEvent);

    /// A server `error` event, or reconnect exhaustion
    fn on_error(&self, failure: StreamFailure);
}

/// Snapshot of a session published after every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: ConnectionState,
    pub attempts: u32,
}

struct Shared {
    session: Mutex<Session>,
    transport: Arc<dyn Transport>,
    handler: Arc<dyn StreamHandler>,
    notifier: Arc<dyn Notifier>,
    status_tx: watch::Sender<SessionStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &Session) {
        self.status_tx.send_replace(SessionStatus {
            state: session.state(),
            attempts: session.attempts(),
        });
    }

    /// Run `f` against the session if `generation` is still the live run.
    /// `disconnect()` takes the same lock, so nothing runs for a stale run.
    fn with_current<T>(&self, generation: u64, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut session = self.lock();
        if !session.is_current(generation) {
            return None;
        }
        let out = f(&mut session);
        self.publish(&session);
        Some(out)
    }
}

/// Reconnecting subscription to one chat stream
///
/// `connect()` spawns a driver task on the current tokio runtime; the task
/// owns the transport connection and the pending reconnect timer.
/// `disconnect()` (or dropping the client) aborts it.
pub struct EventStreamClient {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl EventStreamClient {
    pub fn builder(kind: StreamKind) -> EventStreamClientBuilder {
        EventStreamClientBuilder::new(kind)
    }

    pub fn kind(&self) -> StreamKind {
        self.shared.lock().kind()
    }

    /// Open the stream, tearing down any live connection or pending reconnect
    pub fn connect(&mut self) {
        self.abort_task();

        let generation = {
            let mut session = self.shared.lock();
            let generation = session.start();
            self.shared.publish(&session);
            tracing::info!(
                stream = session.kind().label(),
                endpoint = session.endpoint(),
                "Connecting event stream"
            );
            generation
        };

        let shared = Arc::clone(&self.shared);
        self.task = Some(tokio::spawn(run_session(shared, generation)));
    }

    /// Close the stream and cancel any scheduled reconnect. Idempotent.
    pub fn disconnect(&mut self) {
        let had_task = self.abort_task();

        let mut session = self.shared.lock();
        session.stop();
        self.shared.publish(&session);

        if had_task {
            tracing::info!(stream = session.kind().label(), "Event stream disconnected");
        }
    }

    pub fn status(&self) -> SessionStatus {
        *self.shared.status_tx.borrow()
    }

    pub fn state(&self) -> ConnectionState {
        self.status().state
    }

    pub fn attempts(&self) -> u32 {
        self.status().attempts
    }

    /// Watch status transitions
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status_tx.subscribe()
    }

    fn abort_task(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for EventStreamClient {
    fn drop(&mut self) {
        self.abort_task();
    }
}

async fn run_session(shared: Arc<Shared>, generation: u64) {
    loop {
        let Some((label, endpoint, last_event_id)) = shared.with_current(generation, |s| {
            (
                s.kind().label(),
                s.endpoint().to_string(),
                s.last_event_id().map(str::to_string),
            )
        }) else {
            return;
        };

        match shared.transport.open(&endpoint, last_event_id.as_deref()).await {
            Ok(mut frames) => {
                if shared.with_current(generation, Session::on_open).is_none() {
                    return;
                }
                tracing::info!(stream = label, "Event stream open");

                while let Some(item) = frames.next().await {
                    match item {
                        Ok(frame) => {
                            let delivered = shared.with_current(generation, |s| {
                                let dispatch = s.on_frame(&frame);
                                deliver(&shared, dispatch);
                            });
                            if delivered.is_none() {
                                return;
                            }
                        }
                        Err(e) if e.is_terminal() => {
                            tracing::warn!(stream = label, error = %e, "Event stream failed");
                            break;
                        }
                        Err(e) => {
                            tracing::warn!(stream = label, error = %e, "Event stream transport error");
                        }
                    }
                }
                tracing::debug!(stream = label, "Event stream closed");
            }
            Err(e) => {
                tracing::warn!(stream = label, error = %e, "Failed to open event stream");
            }
        }

        let Some(outcome) = shared.with_current(generation, Session::on_terminal_close) else {
            return;
        };

        match outcome {
            CloseOutcome::Reconnect { attempt, delay } => {
                let max_attempts = shared.lock().policy().max_attempts();
                tracing::info!(
                    stream = label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Scheduling reconnect"
                );
                tokio::time::sleep(delay).await;
                if shared.with_current(generation, Session::on_reconnecting).is_none() {
                    return;
                }
            }
            CloseOutcome::Exhausted { attempts } => {
                tracing::error!(stream = label, attempts, "Reconnect attempts exhausted");
                shared.with_current(generation, |_| {
                    shared.handler.on_error(StreamFailure::Exhausted { attempts });
                });
                return;
            }
        }
    }
}

fn deliver(shared: &Shared, dispatch: Dispatch) {
    match dispatch {
        Dispatch::Deliver {
            event,
            notification,
        } => {
            if let Some(notification) = notification {
                shared.notifier.notify(&notification);
            }
            shared.handler.on_message(event);
        }
        Dispatch::Fail(failure) => shared.handler.on_error(failure),
        Dispatch::Skip | Dispatch::Malformed => {}
    }
}

pub struct EventStreamClientBuilder {
    kind: StreamKind,
    transport: Option<Arc<dyn Transport>>,
    handler: Option<Arc<dyn StreamHandler>>,
    notifier: Arc<dyn Notifier>,
    policy: Option<ReconnectPolicy>,
    context: ClientContext,
}

impl EventStreamClientBuilder {
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            transport: None,
            handler: None,
            notifier: Arc::new(LogNotifier),
            policy: None,
            context: ClientContext::default(),
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn handler(mut self, handler: Arc<dyn StreamHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Override the stream kind's default backoff
    pub fn policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    pub fn build(self) -> Result<EventStreamClient> {
        let transport = self
            .transport
            .ok_or(ClientError::MissingField("transport"))?;
        let handler = self.handler.ok_or(ClientError::MissingField("handler"))?;
        let policy = self.policy.unwrap_or_else(|| self.kind.default_policy());

        let session = Session::new(self.kind, policy, self.context);
        let (status_tx, _) = watch::channel(SessionStatus {
            state: session.state(),
            attempts: session.attempts(),
        });

        Ok(EventStreamClient {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                transport,
                handler,
                notifier: self.notifier,
                status_tx,
            }),
            task: None,
        })
    }
}
