//! Periodic read-receipt refresh for the user's own messages.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use chatstream_types::{ReadMark, ReadStatusRequest, ReadStatusResponse};

use crate::error::TransportError;
use crate::transport::HttpTransport;

/// Ids of the current user's messages that are on screen
pub trait OwnMessageSource: Send + Sync {
    fn own_message_ids(&self) -> Vec<i64>;
}

/// Receives fresh read marks after every successful poll
pub trait ReadMarkSink: Send + Sync {
    fn apply(&self, marks: BTreeMap<i64, ReadMark>);
}

/// Fetches read counts for a batch of messages
#[async_trait]
pub trait ReadStatusFetcher: Send + Sync {
    async fn fetch(
        &self,
        room_id: i64,
        message_ids: &[i64],
    ) -> Result<ReadStatusResponse, TransportError>;
}

#[async_trait]
impl ReadStatusFetcher for HttpTransport {
    async fn fetch(
        &self,
        room_id: i64,
        message_ids: &[i64],
    ) -> Result<ReadStatusResponse, TransportError> {
        let url = self.resolve(&format!("chat/api/rooms/{room_id}/read-status"))?;
        let body = ReadStatusRequest {
            message_ids: message_ids.to_vec(),
        };

        let response = self
            .http_client()
            .post(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Connect {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<ReadStatusResponse>()
            .await
            .map_err(|e| TransportError::Stream(e.to_string()))
    }
}

/// Polls read status for one room on a fixed interval
pub struct ReadStatusPoller {
    room_id: i64,
    interval: Duration,
    fetcher: Arc<dyn ReadStatusFetcher>,
    source: Arc<dyn OwnMessageSource>,
    sink: Arc<dyn ReadMarkSink>,
    task: Option<JoinHandle<()>>,
}

impl ReadStatusPoller {
    pub fn new(
        room_id: i64,
        interval: Duration,
        fetcher: Arc<dyn ReadStatusFetcher>,
        source: Arc<dyn OwnMessageSource>,
        sink: Arc<dyn ReadMarkSink>,
    ) -> Self {
        Self {
            room_id,
            interval,
            fetcher,
            source,
            sink,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Poll now, then once per interval until [`stop`](Self::stop)
    pub fn start(&mut self) {
        self.stop();

        let room_id = self.room_id;
        let period = self.interval;
        let fetcher = Arc::clone(&self.fetcher);
        let source = Arc::clone(&self.source);
        let sink = Arc::clone(&self.sink);

        tracing::debug!(room_id, interval_ms = period.as_millis() as u64, "Starting read-status poller");

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll(room_id, fetcher.as_ref(), source.as_ref(), sink.as_ref()).await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(room_id = self.room_id, "Stopped read-status poller");
        }
    }

    /// One poll outside the timer; returns whether marks were applied
    pub async fn poll_once(&self) -> bool {
        poll(
            self.room_id,
            self.fetcher.as_ref(),
            self.source.as_ref(),
            self.sink.as_ref(),
        )
        .await
    }
}

impl Drop for ReadStatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll(
    room_id: i64,
    fetcher: &dyn ReadStatusFetcher,
    source: &dyn OwnMessageSource,
    sink: &dyn ReadMarkSink,
) -> bool {
    let ids = source.own_message_ids();
    if ids.is_empty() {
        return false;
    }

    match fetcher.fetch(room_id, &ids).await {
        Ok(response) => {
            sink.apply(response.marks());
            true
        }
        Err(e) => {
            tracing::warn!(room_id, error = %e, "Read-status refresh failed");
            false
        }
    }
}
