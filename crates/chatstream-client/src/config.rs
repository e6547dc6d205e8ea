// Client configuration: where the chat server lives and how hard to retry.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{ClientError, Result};
use crate::policy::ReconnectPolicy;
use crate::session::StreamKind;

/// Settings shared by the stream clients and the read-status poller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chat server root, e.g. `http://localhost:5000`
    pub base_url: String,
    /// Session cookie forwarded on every request (env only, never serialized)
    #[serde(default, skip_serializing)]
    pub cookie: Option<String>,
    #[serde(default)]
    pub reconnect: ReconnectSettings,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default = "default_read_status_interval_ms")]
    pub read_status_interval_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_buffer_capacity() -> usize {
    4096
}

fn default_read_status_interval_ms() -> u64 {
    5_000
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cookie: None,
            reconnect: ReconnectSettings::default(),
            connect_timeout_ms: default_connect_timeout_ms(),
            buffer_capacity: default_buffer_capacity(),
            read_status_interval_ms: default_read_status_interval_ms(),
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectSettings) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Parsed base URL, always ending in `/` so endpoint paths join under it
    pub fn base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: self.base_url.clone(),
            detail: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: self.base_url.clone(),
                detail: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }

    pub fn policy_for(&self, kind: &StreamKind) -> ReconnectPolicy {
        self.reconnect.policy_for(kind)
    }

    pub fn read_status_interval(&self) -> Duration {
        Duration::from_millis(self.read_status_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.buffer_capacity == 0 {
            return Err(ClientError::Config("buffer_capacity must be positive".to_string()));
        }
        if self.read_status_interval_ms == 0 {
            return Err(ClientError::Config(
                "read_status_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Backoff constants per stream kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_message_base_delay_ms")]
    pub message_base_delay_ms: u64,
    #[serde(default = "default_room_base_delay_ms")]
    pub room_base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    ReconnectPolicy::DEFAULT_MAX_ATTEMPTS
}

fn default_message_base_delay_ms() -> u64 {
    1_000
}

fn default_room_base_delay_ms() -> u64 {
    2_000
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            message_base_delay_ms: default_message_base_delay_ms(),
            room_base_delay_ms: default_room_base_delay_ms(),
        }
    }
}

impl ReconnectSettings {
    pub fn policy_for(&self, kind: &StreamKind) -> ReconnectPolicy {
        let base_delay_ms = match kind {
            StreamKind::Messages { .. } => self.message_base_delay_ms,
            StreamKind::Rooms => self.room_base_delay_ms,
        };
        ReconnectPolicy::new(Duration::from_millis(base_delay_ms), self.max_attempts)
    }
}
