use std::time::Duration;

/// Linear reconnect backoff with a hard attempt ceiling.
///
/// The k-th consecutive reconnect waits `base_delay * k`. Once `max_attempts`
/// reconnects have failed without an open in between, the session gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Per-room message stream: 1 s steps
    pub fn messages() -> Self {
        Self::new(Duration::from_secs(1), Self::DEFAULT_MAX_ATTEMPTS)
    }

    /// Room-list stream: 2 s steps
    pub fn rooms() -> Self {
        Self::new(Duration::from_secs(2), Self::DEFAULT_MAX_ATTEMPTS)
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before reconnect number `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::messages()
    }
}
