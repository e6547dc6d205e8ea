// Transport seam: the client only sees a stream of SSE frames.

use async_trait::async_trait;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, COOKIE};
use std::pin::Pin;
use std::time::Duration;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, TransportError};
use crate::sse::{parse_sse_stream, SseFrame};

/// Frames of one open connection; the stream ending is a terminal close
pub type FrameStream = Pin<Box<dyn Stream<Item = std::result::Result<SseFrame, TransportError>> + Send>>;

/// Opens server-push connections
///
/// A resolved `open` is the transport-level "open" signal. An error from
/// `open`, a terminal item error or the end of the returned stream all count
/// as a terminal close.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(
        &self,
        path: &str,
        last_event_id: Option<&str>,
    ) -> std::result::Result<FrameStream, TransportError>;
}

/// reqwest-backed SSE transport
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: Url,
    buffer_capacity: usize,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        if let Some(cookie) = &config.cookie {
            let mut value =
                HeaderValue::from_str(cookie).map_err(|_| ClientError::InvalidHeader("Cookie"))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        // No overall request timeout: it would cut long-lived streams
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            buffer_capacity: config.buffer_capacity,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub(crate) fn resolve(&self, path: &str) -> std::result::Result<Url, TransportError> {
        self.base_url.join(path).map_err(|e| TransportError::Connect {
            url: format!("{}{}", self.base_url, path),
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(
        &self,
        path: &str,
        last_event_id: Option<&str>,
    ) -> std::result::Result<FrameStream, TransportError> {
        let url = self.resolve(path)?;

        let mut request = self.http_client.get(url.clone());
        if let Some(id) = last_event_id {
            request = request.header("Last-Event-ID", id);
        }

        let response = request.send().await.map_err(|e| TransportError::Connect {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(parse_sse_stream(response.bytes_stream(), self.buffer_capacity))
    }
}
